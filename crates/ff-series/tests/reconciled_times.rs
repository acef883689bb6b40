use std::fs;

use ff_folder::SimulationFolder;
use ff_series::{Manifest, SnapshotFormat};
use proptest::prelude::*;

fn vtm(label: usize, time: f64) -> String {
    format!(
        "<VTKFile type='vtkMultiBlockDataSet'>\n<DataSet name=\"internal\" file=\"nb1_{label}/internal.vtu\"/>\n<DataArray Name='TimeValue'>\n{time}\n</DataArray>\n</VTKFile>\n"
    )
}

#[test]
fn nested_case_folder_is_reconciled() {
    let dir = tempfile::tempdir().unwrap();
    let vtk = dir.path().join("case").join("VTK");
    fs::create_dir_all(&vtk).unwrap();
    for (i, t) in [0.0, 0.1, 0.2].into_iter().enumerate() {
        fs::write(vtk.join(format!("case_{i}.vtm")), vtm(i, t)).unwrap();
    }
    let folder = SimulationFolder::open(dir.path()).unwrap();
    assert_eq!(ff_series::times(&folder).unwrap(), vec![0.0, 0.1, 0.2]);

    let written = Manifest::read(&vtk.join("case.vtm.series")).unwrap();
    assert_eq!(written.len(), 3);
    assert_eq!(
        Manifest::file_name("case", SnapshotFormat::Vtm),
        "case.vtm.series"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn times_are_increasing_and_cover_every_snapshot_time(
        // zero steps give snapshots sharing a time
        steps in prop::collection::vec(0u32..20, 1..12),
        written in 0usize..12,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let vtk = dir.path().join("VTK");
        fs::create_dir_all(&vtk).unwrap();

        let mut t = 0u32;
        let mut pairs = Vec::new();
        for (i, step) in steps.iter().enumerate() {
            let time = f64::from(t) / 10.0;
            fs::write(vtk.join(format!("nb1_{i}.vtm")), vtm(i, time)).unwrap();
            pairs.push((i.to_string(), time));
            t += step;
        }
        // a manifest that may list only a prefix of the snapshots
        let listed = written.min(pairs.len());
        Manifest::from_labels("nb1", SnapshotFormat::Vtm, &pairs[..listed])
            .write(&vtk.join("nb1.vtm.series"))
            .unwrap();

        let folder = SimulationFolder::new(dir.path());
        let times = ff_series::times(&folder).unwrap();
        let distinct = ff_core::unique_sorted(pairs.iter().map(|p| p.1)).len();
        prop_assert!(times.len() >= distinct);
        prop_assert!(times.windows(2).all(|w| w[0] < w[1]));
    }
}
