//! The `.series` manifest file.
//!
//! ```json
//! {
//!   "file-series-version" : "1.0",
//!   "files" : [
//!     { "name" : "case_0.vtm", "time" : 0 },
//!     { "name" : "case_1.vtm", "time" : 0.1 }
//!   ]
//! }
//! ```

use std::path::Path;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::snapshot::SnapshotFormat;
use crate::{SeriesError, SeriesResult};

pub const MANIFEST_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "file-series-version")]
    pub version: String,
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build a manifest from (label, time) pairs, sorted by time.
    ///
    /// Entry names are `{base}_{label}{ext}`. Of pairs with equal times only
    /// the highest label is kept, so times are strictly increasing.
    pub fn from_labels(base: &str, format: SnapshotFormat, pairs: &[(String, f64)]) -> Self {
        let mut pairs: Vec<&(String, f64)> = pairs.iter().collect();
        pairs.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| label_order(&a.0, &b.0)));
        let mut files: Vec<ManifestEntry> = Vec::with_capacity(pairs.len());
        for (label, time) in pairs {
            let entry = ManifestEntry {
                name: format!("{base}_{label}{}", format.extension()),
                time: *time,
            };
            // one entry per time: the highest label wins
            if let Some(last) = files.last_mut()
                && last.time == entry.time
            {
                tracing::warn!(dropped = %last.name, kept = %entry.name, time = *time, "duplicate snapshot time");
                *last = entry;
                continue;
            }
            files.push(entry);
        }
        Self {
            version: MANIFEST_VERSION.to_string(),
            files,
        }
    }

    /// File name of the manifest for a given base and snapshot format.
    pub fn file_name(base: &str, format: SnapshotFormat) -> String {
        format!("{base}{}.series", format.extension())
    }

    pub fn times(&self) -> Vec<f64> {
        self.files.iter().map(|f| f.time).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn read(path: &Path) -> SeriesResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SeriesError::io(path, e))?;
        let manifest: Manifest = serde_json::from_str(&text).map_err(|source| SeriesError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if manifest.version != MANIFEST_VERSION {
            return Err(SeriesError::UnsupportedVersion {
                found: manifest.version,
                expected: MANIFEST_VERSION,
            });
        }
        Ok(manifest)
    }

    /// Write through a temporary file and rename, so readers never observe a
    /// half-written manifest.
    pub fn write(&self, path: &Path) -> SeriesResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| SeriesError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp = path.with_extension("series.tmp");
        std::fs::write(&tmp, json).map_err(|e| SeriesError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| SeriesError::io(path, e))?;
        tracing::info!(path = %path.display(), entries = self.files.len(), "exported manifest");
        Ok(())
    }
}

/// Numeric labels compare numerically, anything else lexically.
fn label_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

pub(crate) fn modified(path: &Path) -> SeriesResult<SystemTime> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| SeriesError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_sorted_by_time() {
        let pairs = vec![
            ("20".to_string(), 2.0),
            ("0".to_string(), 0.0),
            ("5".to_string(), 0.5),
        ];
        let m = Manifest::from_labels("case", SnapshotFormat::Vtm, &pairs);
        assert_eq!(m.times(), vec![0.0, 0.5, 2.0]);
        assert_eq!(m.files[0].name, "case_0.vtm");
        assert_eq!(Manifest::file_name("case", SnapshotFormat::Vtm), "case.vtm.series");
    }

    #[test]
    fn equal_times_keep_the_highest_label() {
        let pairs = vec![
            ("2".to_string(), 0.1),
            ("0".to_string(), 0.0),
            ("1".to_string(), 0.1),
        ];
        let m = Manifest::from_labels("case", SnapshotFormat::Vtm, &pairs);
        assert_eq!(m.times(), vec![0.0, 0.1]);
        assert_eq!(m.files[1].name, "case_2.vtm");
    }

    #[test]
    fn json_uses_series_field_names() {
        let m = Manifest::from_labels("nb1", SnapshotFormat::Vtk, &[("3".to_string(), 0.2)]);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"file-series-version\":\"1.0\""));
        assert!(json.contains("\"name\":\"nb1_3.vtk\""));
    }

    #[test]
    fn reads_solver_written_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.vtm.series");
        std::fs::write(
            &path,
            "{\n  \"file-series-version\" : \"1.0\",\n  \"files\" : [\n    { \"name\" : \"case_0.vtm\", \"time\" : 0 },\n    { \"name\" : \"case_1.vtm\", \"time\" : 0.1 }\n  ]\n}",
        )
        .unwrap();
        let m = Manifest::read(&path).unwrap();
        assert_eq!(m.times(), vec![0.0, 0.1]);
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.vtm.series");
        std::fs::write(&path, r#"{"file-series-version":"2.0","files":[]}"#).unwrap();
        assert!(matches!(
            Manifest::read(&path).unwrap_err(),
            SeriesError::UnsupportedVersion { .. }
        ));
    }
}
