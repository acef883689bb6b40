use std::fs;

use ff_folder::{FolderGeometry, PointCloud, PointSet, SimulationFolder};

const LEGEND: &str = "\
folder,nb7
nozzle inner width (mm),0.603
nozzle thickness (mm),0.152
nozzle center x coord (mm),-2.4
nozzle center y coord (mm),0
nozzle bottom coord (mm),0.3
bath velocity (m/s),0.01
ink velocity (m/s),0.01
";

#[test]
fn reads_geometry_and_points_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nb7");
    fs::create_dir_all(root.join("interfacePoints")).unwrap();
    fs::write(root.join("legend.csv"), LEGEND).unwrap();
    fs::write(
        root.join("interfacePoints").join("interfacePoints_t_25.csv"),
        "x,y,z,vx,vy,vz,time\nm,m,m,m/s,m/s,m/s,s\n0.001,0,0,0.01,0,0,2.5\n",
    )
    .unwrap();

    let folder = SimulationFolder::open(&root).expect("folder opens");
    assert_eq!(folder.short_name(), format!("{}/nb7", dir.path().file_name().unwrap().to_string_lossy()));
    assert_eq!(folder.name(), "nb7");

    let geo = FolderGeometry::read(folder.root()).expect("geometry");
    assert!((geo.ink_velocity - 10.0).abs() < 1e-9);
    assert_eq!(geo.nozzle_angle_deg, 0.0);

    let files = folder.point_files(PointSet::Interface).unwrap();
    assert_eq!(files.len(), 1);
    let cloud = PointCloud::read(&folder.points_file(PointSet::Interface, 2.5)).unwrap();
    assert_eq!(cloud.len(), 1);
    assert_eq!(cloud.points[0].time, Some(2.5));
}

#[test]
fn missing_point_folder_is_missing_data() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("legend.csv"), LEGEND).unwrap();
    let folder = SimulationFolder::open(dir.path()).unwrap();
    let err = folder.point_files(PointSet::Nozzle).unwrap_err();
    assert!(err.is_missing_data());
}
