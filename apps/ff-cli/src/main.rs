use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use ff_app::{
    AppError, AppResult, BatchOptions, FolderStatus, PipelineConfig, batch, pipeline, summary,
};
use ff_folder::SimulationFolder;
use ff_steady::SteadyMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ff-cli")]
#[command(about = "FilamentFlow CLI - post-processing for printed-filament simulations", long_about = None)]
struct Cli {
    /// Pipeline config YAML (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Recompute outputs that already exist
    #[arg(long, global = true)]
    overwrite: bool,
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the reconciled snapshot times of a run
    Times {
        /// Simulation folder
        folder: PathBuf,
    },
    /// Write sliceSummaries.csv for a run
    Summarize {
        /// Simulation folder
        folder: PathBuf,
    },
    /// Write steadyTimes.csv and steadyPositions.csv for a run
    Steady {
        /// Simulation folder
        folder: PathBuf,
    },
    /// Print the survival profile across the nozzle
    Survival {
        /// Simulation folder
        folder: PathBuf,
        /// Snapshot time in seconds (overrides the config)
        #[arg(long)]
        time: Option<f64>,
    },
    /// Post-process every run below a top folder
    Batch {
        /// Folder holding the simulation folders
        top: PathBuf,
        /// Also compute survival profiles
        #[arg(long)]
        survival: bool,
    },
    /// Collect one row per run at a time and distance behind the nozzle
    SummaryTable {
        /// Folders holding the simulation folders
        #[arg(required = true)]
        tops: Vec<PathBuf>,
        /// Slice time in seconds
        #[arg(long)]
        time: f64,
        /// Distance behind the nozzle centre in mm
        #[arg(long)]
        xbehind: f64,
        /// Folder to write the table to
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    tracing::debug!(fingerprint = %config.fingerprint(), "pipeline config");

    match cli.command {
        Commands::Times { folder } => cmd_times(&folder),
        Commands::Summarize { folder } => cmd_summarize(&folder, &config, cli.overwrite),
        Commands::Steady { folder } => cmd_steady(&folder, &config, cli.overwrite),
        Commands::Survival { folder, time } => {
            let mut config = config;
            if let Some(t) = time {
                config.survival.time = t;
            }
            cmd_survival(&folder, &config)
        }
        Commands::Batch { top, survival } => cmd_batch(
            &top,
            &config,
            BatchOptions {
                overwrite: cli.overwrite,
                survival,
            },
        ),
        Commands::SummaryTable {
            tops,
            time,
            xbehind,
            export,
        } => cmd_summary_table(&tops, time, xbehind, export.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn open(folder: &Path) -> AppResult<SimulationFolder> {
    Ok(SimulationFolder::open(folder)?)
}

fn cmd_times(folder: &Path) -> AppResult<()> {
    let folder = open(folder)?;
    let times = pipeline::folder_times(&folder)?;
    if times.times.is_empty() {
        println!("No snapshots in {}", folder.short_name());
    } else {
        println!("{} snapshots in {}:", times.times.len(), folder.short_name());
        for t in &times.times {
            println!("  {t}");
        }
    }
    match (times.current.simulation_time, times.current.end_time) {
        (Some(t), Some(end)) => println!("Current time: {t} s of {end} s"),
        (Some(t), None) => println!("Current time: {t} s"),
        _ => {}
    }
    Ok(())
}

fn cmd_summarize(folder: &Path, config: &PipelineConfig, overwrite: bool) -> AppResult<()> {
    let folder = open(folder)?;
    let out = pipeline::summarize_folder(&folder, config, overwrite, &config.deadline())?;
    if out.written {
        println!(
            "✓ {} slices written to {} ({} rejected)",
            out.series.len(),
            folder.slice_summaries_path().display(),
            out.rejected.len()
        );
        for r in &out.rejected {
            println!("  t = {}, x = {}: {}", r.time, r.x, r.error);
        }
    } else {
        println!("✓ Slice summaries already exist ({} slices)", out.series.len());
    }
    Ok(())
}

fn cmd_steady(folder: &Path, config: &PipelineConfig, overwrite: bool) -> AppResult<()> {
    let folder = open(folder)?;
    let deadline = config.deadline();
    let Some(out) = pipeline::sum_and_steady(&folder, config, overwrite, &deadline)? else {
        return Err(AppError::MissingData(format!(
            "no interface points in {}",
            folder.short_name()
        )));
    };
    for (mode, steady) in [
        (SteadyMode::TimeAtPosition, &out.times),
        (SteadyMode::PositionAtTime, &out.positions),
    ] {
        let [group, start, end] = mode.columns();
        println!("{mode:?}: {} windows", steady.table.windows.len());
        for w in &steady.table.windows {
            let end_value = if w.is_open() {
                "open".to_string()
            } else {
                w.end.to_string()
            };
            println!("  {group} = {}: {start} = {}, {end} = {end_value}", w.group, w.start);
        }
    }
    Ok(())
}

fn cmd_survival(folder: &Path, config: &PipelineConfig) -> AppResult<()> {
    let folder = open(folder)?;
    let out = pipeline::survival_folder(&folder, config, &config.deadline())?;
    println!(
        "Survival at t = {} s ({}):",
        config.survival.time,
        config.survival.law.label()
    );
    for track in out.profile.tracks.values() {
        println!(
            "  rbar = {:.3}: {:.6} ({} steps, {} skipped)",
            track.rbar,
            track.survival(),
            track.steps().len(),
            track.skipped()
        );
    }
    if !out.profile.dropped.is_empty() {
        println!("  dropped for coverage: {:?}", out.profile.dropped);
    }
    match out.rate {
        Some(rate) => println!("✓ Area-weighted survival: {rate:.6}"),
        None => println!("No bins with weight"),
    }
    Ok(())
}

fn cmd_batch(top: &Path, config: &PipelineConfig, options: BatchOptions) -> AppResult<()> {
    let reports = batch::process_folders(top, config, options)?;
    for r in &reports {
        let status = match r.status {
            FolderStatus::Processed => "processed",
            FolderStatus::UpToDate => "up to date",
            FolderStatus::Skipped => "skipped",
            FolderStatus::Failed => "FAILED",
        };
        print!("  {:<16} {status:<10} {} slices", r.folder, r.slices);
        if let Some(rate) = r.survival_rate {
            print!(", survival {rate:.4}");
        }
        if let Some(msg) = &r.message {
            print!(" ({msg})");
        }
        println!();
    }
    let failed = reports
        .iter()
        .filter(|r| r.status == FolderStatus::Failed)
        .count();
    println!("✓ {} folders, {failed} failed", reports.len());
    Ok(())
}

fn cmd_summary_table(
    tops: &[PathBuf],
    time: f64,
    xbehind: f64,
    export: Option<&Path>,
) -> AppResult<()> {
    if let Some(dir) = export
        && !dir.is_dir()
    {
        return Err(AppError::InvalidInput(format!(
            "export folder {} does not exist",
            dir.display()
        )));
    }
    let table = summary::summary_table(tops, time, xbehind, export)?;
    match export {
        Some(dir) => println!(
            "✓ {} rows written to {}",
            table.rows.len(),
            dir.join(summary::summary_table_name(time, xbehind)).display()
        ),
        None => print!("{}", table.to_csv()),
    }
    Ok(())
}
