//! Batch post-processing over every run below a top folder.

use std::path::Path;

use ff_folder::{case_folders, SimulationFolder};
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::error::{AppError, AppResult};
use crate::pipeline::{folder_times, sum_and_steady, survival_folder};
use crate::report::{FolderReport, FolderStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Recompute outputs that already exist.
    pub overwrite: bool,
    /// Also compute the survival profile.
    pub survival: bool,
}

/// Run the pipeline on one folder and write its report.
///
/// Missing inputs mark the folder `Skipped`; any other error marks it
/// `Failed`. Neither aborts the caller.
pub fn process_folder(
    folder: &SimulationFolder,
    config: &PipelineConfig,
    options: BatchOptions,
) -> AppResult<FolderReport> {
    let fingerprint = config.fingerprint();
    let report_path = folder.report_path();
    if !options.overwrite
        && let Some(previous) = FolderReport::read(&report_path)
        && previous.is_current(&fingerprint)
        && (previous.survival || !options.survival)
    {
        tracing::debug!(folder = %folder.short_name(), "up to date");
        return Ok(FolderReport {
            status: FolderStatus::UpToDate,
            ..previous
        });
    }

    let deadline = config.deadline();
    let mut report = FolderReport::new(folder.name(), FolderStatus::Processed, &fingerprint);
    if let Err(e) = run_pipeline(folder, config, options, &deadline, &mut report) {
        report.status = if e.is_missing_data() {
            tracing::warn!(folder = %folder.short_name(), error = %e, "skipping folder");
            FolderStatus::Skipped
        } else {
            tracing::warn!(folder = %folder.short_name(), error = %e, "folder failed");
            FolderStatus::Failed
        };
        report.message = Some(e.to_string());
    }
    report.elapsed_s = deadline.elapsed_secs();
    report.write(&report_path)?;
    Ok(report)
}

fn run_pipeline(
    folder: &SimulationFolder,
    config: &PipelineConfig,
    options: BatchOptions,
    deadline: &ff_core::Deadline,
    report: &mut FolderReport,
) -> AppResult<()> {
    let times = folder_times(folder)?;
    report.current_time = times.current.simulation_time;
    report.end_time = times.current.end_time;

    let Some(out) = sum_and_steady(folder, config, options.overwrite, deadline)? else {
        return Err(AppError::MissingData(format!(
            "no interface points in {}",
            folder.short_name()
        )));
    };
    report.slices = out.summary.series.len();
    report.rejected_slices = out.summary.rejected.len();
    report.steady_times = out.times.table.windows.len();
    report.steady_positions = out.positions.table.windows.len();

    if options.survival {
        report.survival = true;
        let survival = survival_folder(folder, config, deadline)?;
        report.survival_rate = survival.rate;
        report.survival_bins = survival.profile.tracks.len();
    }
    Ok(())
}

/// Process every simulation folder in `top` in parallel.
pub fn process_folders(
    top: &Path,
    config: &PipelineConfig,
    options: BatchOptions,
) -> AppResult<Vec<FolderReport>> {
    let folders = case_folders(top)?;
    tracing::info!(top = %top.display(), folders = folders.len(), "processing folders");
    let reports = folders
        .par_iter()
        .map(|folder| process_folder(folder, config, options))
        .collect::<AppResult<Vec<_>>>()?;
    let failed = reports
        .iter()
        .filter(|r| r.status == FolderStatus::Failed)
        .count();
    tracing::info!(folders = reports.len(), failed, "batch finished");
    Ok(reports)
}
