use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use ff_app::{
    process_folder, process_folders, summary_table, BatchOptions, FolderStatus, PipelineConfig,
};
use ff_folder::SimulationFolder;

const LEGEND: &str = "\
nozzle inner width (mm),0.5
nozzle thickness (mm),0.1
nozzle center x coord (mm),0
nozzle center y coord (mm),0
nozzle bottom coord (mm),0.5
bath velocity (m/s),0.01
ink velocity (m/s),0.01
ink
transportModel,Newtonian
nu,0.001
rho,1000
sup
transportModel,Newtonian
nu,0.0005
rho,1000
";

/// Interface points in metres: circular slices of radius 0.25 mm.
fn points_csv(time: f64, xs_mm: &[f64]) -> String {
    let mut out = String::from("x,y,z,vx,vy,vz,time\nm,m,m,m/s,m/s,m/s,s\n");
    for x in xs_mm {
        for i in 0..24 {
            let th = std::f64::consts::TAU * i as f64 / 24.0;
            let _ = writeln!(
                out,
                "{},{},{},0.009,0,0,{time}",
                x / 1000.0,
                0.25 * th.cos() / 1000.0,
                0.25 * th.sin() / 1000.0
            );
        }
    }
    out
}

fn make_run(top: &Path, name: &str) -> SimulationFolder {
    let root = top.join(name);
    let ip = root.join("interfacePoints");
    fs::create_dir_all(&ip).unwrap();
    fs::write(root.join("legend.csv"), LEGEND).unwrap();
    fs::write(ip.join("interfacePoints_t_5.csv"), points_csv(0.5, &[2.0, 4.0])).unwrap();
    fs::write(ip.join("interfacePoints_t_10.csv"), points_csv(1.0, &[2.0, 4.0])).unwrap();
    SimulationFolder::open(&root).unwrap()
}

#[test]
fn batch_processes_every_run_and_skips_empty_ones() {
    let dir = tempfile::tempdir().unwrap();
    let a = make_run(dir.path(), "nb2");
    let b = make_run(dir.path(), "nb10");
    // legend only: nothing to summarise
    let empty = dir.path().join("nb3");
    fs::create_dir_all(&empty).unwrap();
    fs::write(empty.join("legend.csv"), LEGEND).unwrap();

    let config = PipelineConfig::default();
    let reports = process_folders(dir.path(), &config, BatchOptions::default()).unwrap();
    let summary: Vec<(&str, FolderStatus)> =
        reports.iter().map(|r| (r.folder.as_str(), r.status)).collect();
    assert_eq!(
        summary,
        vec![
            ("nb2", FolderStatus::Processed),
            ("nb3", FolderStatus::Skipped),
            ("nb10", FolderStatus::Processed),
        ]
    );
    for run in [&a, &b] {
        assert!(run.slice_summaries_path().exists());
        assert!(run.steady_times_path().exists());
        assert!(run.steady_positions_path().exists());
        assert!(run.report_path().exists());
    }
    assert_eq!(reports[0].slices, 4);
    assert_eq!(reports[0].config_fingerprint, config.fingerprint());
    assert!(reports[1].message.is_some());
}

#[test]
fn rerun_with_same_config_is_up_to_date() {
    let dir = tempfile::tempdir().unwrap();
    let run = make_run(dir.path(), "nb1");
    let config = PipelineConfig::default();

    let first = process_folder(&run, &config, BatchOptions::default()).unwrap();
    assert_eq!(first.status, FolderStatus::Processed);
    let second = process_folder(&run, &config, BatchOptions::default()).unwrap();
    assert_eq!(second.status, FolderStatus::UpToDate);
    assert_eq!(second.slices, first.slices);

    let mut changed = config.clone();
    changed.steady.tolerance = 0.02;
    let third = process_folder(&run, &changed, BatchOptions::default()).unwrap();
    assert_eq!(third.status, FolderStatus::Processed);

    let forced = process_folder(
        &run,
        &changed,
        BatchOptions {
            overwrite: true,
            survival: false,
        },
    )
    .unwrap();
    assert_eq!(forced.status, FolderStatus::Processed);
}

#[test]
fn survival_without_nozzle_points_skips_the_folder() {
    let dir = tempfile::tempdir().unwrap();
    let run = make_run(dir.path(), "nb1");
    let report = process_folder(
        &run,
        &PipelineConfig::default(),
        BatchOptions {
            overwrite: false,
            survival: true,
        },
    )
    .unwrap();
    assert_eq!(report.status, FolderStatus::Skipped);
    assert!(report.survival_rate.is_none());
}

#[test]
fn summary_table_joins_rheology_and_slices() {
    let dir = tempfile::tempdir().unwrap();
    let top = dir.path().join("runs");
    let export = dir.path().join("out");
    fs::create_dir_all(&export).unwrap();
    for name in ["nb1", "nb2"] {
        make_run(&top, name);
    }
    process_folders(&top, &PipelineConfig::default(), BatchOptions::default()).unwrap();

    let table = summary_table(&[top.clone()], 1.0, 4.0, Some(&export)).unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][0], "nb1");
    let ratio = table.column_index("viscRatio").unwrap();
    assert_eq!(table.rows[0][ratio].parse::<f64>().unwrap(), 2.0);
    let xb = table.column_index("xbehind").unwrap();
    assert!((table.rows[1][xb].parse::<f64>().unwrap() - 4.0).abs() < 1e-9);
    assert!(export.join("summaryTable_x_4_t_1.csv").exists());

    // no slice anywhere near the request
    let empty = summary_table(&[top], 1.0, 40.0, None).unwrap();
    assert!(empty.is_empty());
}
