//! On-disk layout of one simulation run.
//!
//! A run folder either is the case folder itself or holds it under `case/`.
//! Point clouds exported by the visualisation tool live in per-kind
//! subfolders named after the kind, one file per tenth of a second.

use std::path::{Path, PathBuf};

use ff_core::FfError;

use crate::FolderResult;

pub const LEGEND_FILE: &str = "legend.csv";
pub const SLICE_SUMMARIES_FILE: &str = "sliceSummaries.csv";
pub const STEADY_TIMES_FILE: &str = "steadyTimes.csv";
pub const STEADY_POSITIONS_FILE: &str = "steadyPositions.csv";
pub const REPORT_FILE: &str = "postprocess.json";

/// Kinds of point-cloud export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointSet {
    /// Points on the ink/support interface.
    Interface,
    /// All points inside the nozzle.
    Nozzle,
    /// Points in the central y slice of the nozzle.
    NozzleSlice,
}

impl PointSet {
    pub fn dir_name(self) -> &'static str {
        match self {
            PointSet::Interface => "interfacePoints",
            PointSet::Nozzle => "nozzlePoints",
            PointSet::NozzleSlice => "nozzleSlicePoints",
        }
    }

    /// File name for the export at `time` seconds.
    pub fn file_name(self, time: f64) -> String {
        format!("{}_t_{}.csv", self.dir_name(), time_tag(time))
    }
}

/// Time tag used in exported file names: tenths of a second.
pub fn time_tag(time: f64) -> i64 {
    (time * 10.0).round() as i64
}

/// Time encoded in an export file name such as `interfacePoints_t_25.csv`.
pub fn file_time(path: &Path) -> Option<f64> {
    let stem = path.file_stem()?.to_str()?;
    let (_, tag) = stem.rsplit_once("_t_")?;
    tag.parse::<i64>().ok().map(|t| t as f64 / 10.0)
}

/// A simulation run folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationFolder {
    root: PathBuf,
}

impl SimulationFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open a folder, failing with `MissingData` if it does not look like a run.
    pub fn open(root: impl Into<PathBuf>) -> FolderResult<Self> {
        let folder = Self::new(root);
        if !folder.root.is_dir() {
            return Err(FfError::missing(format!("folder {}", folder.root.display())).into());
        }
        if folder.case_folder().is_none() {
            return Err(FfError::missing(format!(
                "simulation files in {}",
                folder.root.display()
            ))
            .into());
        }
        Ok(folder)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder name without its parent.
    pub fn name(&self) -> String {
        file_name_string(&self.root)
    }

    /// Short display name: parent/base.
    pub fn short_name(&self) -> String {
        let base = file_name_string(&self.root);
        match self.root.parent() {
            Some(parent) if !file_name_string(parent).is_empty() => {
                format!("{}/{}", file_name_string(parent), base)
            }
            _ => base,
        }
    }

    /// Folder holding the solver case files (constant, system, time dirs).
    pub fn case_folder(&self) -> Option<PathBuf> {
        let nested = self.root.join("case");
        if nested.is_dir() {
            return Some(nested);
        }
        let markers = ["constant", "VTK", PointSet::Interface.dir_name(), LEGEND_FILE];
        markers
            .iter()
            .any(|m| self.root.join(m).exists())
            .then(|| self.root.clone())
    }

    pub fn vtk_folder(&self) -> Option<PathBuf> {
        [self.root.join("VTK"), self.root.join("case").join("VTK")]
            .into_iter()
            .find(|p| p.is_dir())
    }

    pub fn legend_path(&self) -> PathBuf {
        self.root.join(LEGEND_FILE)
    }

    pub fn points_dir(&self, set: PointSet) -> PathBuf {
        self.root.join(set.dir_name())
    }

    pub fn points_file(&self, set: PointSet, time: f64) -> PathBuf {
        self.points_dir(set).join(set.file_name(time))
    }

    /// All csv files in a point-set folder, sorted by name.
    pub fn point_files(&self, set: PointSet) -> FolderResult<Vec<PathBuf>> {
        let dir = self.points_dir(set);
        if !dir.is_dir() {
            return Err(FfError::missing(format!("{} folder", set.dir_name())).into());
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| crate::FolderError::io(&dir, e))? {
            let entry = entry.map_err(|e| crate::FolderError::io(&dir, e))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn slice_summaries_path(&self) -> PathBuf {
        self.root.join(SLICE_SUMMARIES_FILE)
    }

    pub fn steady_times_path(&self) -> PathBuf {
        self.root.join(STEADY_TIMES_FILE)
    }

    pub fn steady_positions_path(&self) -> PathBuf {
        self.root.join(STEADY_POSITIONS_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.root.join(REPORT_FILE)
    }
}

/// True when `folder` is a simulation folder (and not a shared mesh folder).
pub fn is_sim_folder(folder: &Path) -> bool {
    if folder.file_name().is_some_and(|n| n == "mesh") {
        return false;
    }
    folder.is_dir() && SimulationFolder::new(folder).case_folder().is_some()
}

/// All simulation folders directly inside `top`.
///
/// Folders named like `nb12` sort by their numeric suffix; anything else
/// sorts after them by name.
pub fn case_folders(top: &Path) -> FolderResult<Vec<SimulationFolder>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(top).map_err(|e| crate::FolderError::io(top, e))? {
        let entry = entry.map_err(|e| crate::FolderError::io(top, e))?;
        let path = entry.path();
        if is_sim_folder(&path) {
            found.push(path);
        }
    }
    found.sort_by_key(|p| {
        let name = file_name_string(p);
        let index = name.get(2..).and_then(|s| s.parse::<u64>().ok());
        (index.is_none(), index.unwrap_or(0), name)
    });
    Ok(found.into_iter().map(SimulationFolder::new).collect())
}

fn file_name_string(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn file_names_use_tenths_of_seconds() {
        assert_eq!(
            PointSet::Interface.file_name(2.5),
            "interfacePoints_t_25.csv"
        );
        assert_eq!(PointSet::Nozzle.file_name(0.0), "nozzlePoints_t_0.csv");
        assert_eq!(time_tag(0.30000000000000004), 3);
        assert_eq!(
            file_time(Path::new("run/interfacePoints/interfacePoints_t_25.csv")),
            Some(2.5)
        );
        assert_eq!(file_time(Path::new("legend.csv")), None);
    }

    #[test]
    fn case_folder_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let run = dir.path().join("nb1");
        fs::create_dir_all(run.join("case").join("constant")).unwrap();
        let folder = SimulationFolder::new(&run);
        assert_eq!(folder.case_folder(), Some(run.join("case")));

        let flat = dir.path().join("nb2");
        fs::create_dir_all(flat.join("constant")).unwrap();
        assert_eq!(SimulationFolder::new(&flat).case_folder(), Some(flat.clone()));

        let empty = dir.path().join("nb3");
        fs::create_dir_all(&empty).unwrap();
        assert_eq!(SimulationFolder::new(&empty).case_folder(), None);
        assert!(SimulationFolder::open(&empty).unwrap_err().is_missing_data());
    }

    #[test]
    fn case_folders_sort_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["nb10", "nb2", "mesh", "nb1"] {
            fs::create_dir_all(dir.path().join(name).join("constant")).unwrap();
        }
        let names: Vec<String> = case_folders(dir.path())
            .unwrap()
            .iter()
            .map(|f| file_name_string(f.root()))
            .collect();
        assert_eq!(names, vec!["nb1", "nb2", "nb10"]);
    }
}
