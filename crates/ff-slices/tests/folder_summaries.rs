use std::fmt::Write as _;
use std::fs;

use ff_core::Deadline;
use ff_folder::{FolderGeometry, SimulationFolder};
use ff_slices::{metric_values, ExtractorConfig, SliceMetric, SliceSummarySeries};

const LEGEND: &str = "\
nozzle inner width (mm),0.5
nozzle thickness (mm),0.1
nozzle center x coord (mm),0
nozzle center y coord (mm),0
nozzle bottom coord (mm),0.5
bath velocity (m/s),0.01
ink velocity (m/s),0.01
";

/// Interface points in metres: circular slices of radius 0.25 mm.
fn points_csv(time: f64, xs_mm: &[f64]) -> String {
    let mut out = String::from("x,y,z,vx,vy,vz,time\nm,m,m,m/s,m/s,m/s,s\n");
    for x in xs_mm {
        for i in 0..24 {
            let th = std::f64::consts::TAU * i as f64 / 24.0;
            let y = 0.25 * th.cos();
            let z = 0.25 * th.sin();
            let _ = writeln!(out, "{},{},{},0.009,0,0,{time}", x / 1000.0, y / 1000.0, z / 1000.0);
        }
    }
    out
}

#[test]
fn summarises_a_run_and_reads_it_back() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nb1");
    let ip = root.join("interfacePoints");
    fs::create_dir_all(&ip).unwrap();
    fs::write(root.join("legend.csv"), LEGEND).unwrap();
    // threshold is 0.25 + 0.1 + 0.5 = 0.85 mm
    fs::write(ip.join("interfacePoints_t_10.csv"), points_csv(1.0, &[0.5, 2.0, 4.0])).unwrap();
    fs::write(ip.join("interfacePoints_t_5.csv"), points_csv(0.5, &[2.0])).unwrap();

    let folder = SimulationFolder::open(&root).unwrap();
    let geo = FolderGeometry::read(folder.root()).unwrap();
    let (series, rejected) =
        SliceSummarySeries::from_folder(&folder, &geo, &ExtractorConfig::default(), &Deadline::none())
            .unwrap();
    assert!(rejected.is_empty());
    let keys: Vec<(f64, f64)> = series.iter().map(|r| (r.time, (r.x * 1e6).round() / 1e6)).collect();
    assert_eq!(keys, vec![(0.5, 2.0), (1.0, 2.0), (1.0, 4.0)]);
    let first = &series.records()[0];
    assert!((first.speed - 9.0).abs() < 1e-9);
    assert!((first.speeddecay - 0.9).abs() < 1e-9);
    assert!((first.maxwidthn - 1.0).abs() < 1e-9);

    let path = folder.slice_summaries_path();
    series.write(&path).unwrap();
    let back = SliceSummarySeries::read(&path).unwrap();
    assert_eq!(back.len(), 3);

    let v = metric_values(&back, 1.0, back.records()[2].xbehind + 0.1, &[SliceMetric::AspectRatio]).unwrap();
    assert!((v[0].value - 1.0).abs() < 1e-9);
}

#[test]
fn run_without_interface_points_is_missing_data() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("legend.csv"), LEGEND).unwrap();
    let folder = SimulationFolder::open(dir.path()).unwrap();
    let geo = FolderGeometry::read(folder.root()).unwrap();
    let err = SliceSummarySeries::from_folder(&folder, &geo, &ExtractorConfig::default(), &Deadline::none())
        .unwrap_err();
    assert!(err.is_missing_data());
}
