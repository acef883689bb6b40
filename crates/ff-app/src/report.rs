//! `postprocess.json`: what the last batch run did to a folder.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderStatus {
    Processed,
    /// A previous run with the same config already produced the outputs.
    UpToDate,
    /// Nothing to process yet.
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderReport {
    pub folder: String,
    pub status: FolderStatus,
    /// RFC 3339 time the report was written.
    pub timestamp: String,
    pub config_fingerprint: String,
    pub elapsed_s: f64,
    #[serde(default)]
    pub slices: usize,
    #[serde(default)]
    pub rejected_slices: usize,
    #[serde(default)]
    pub steady_times: usize,
    #[serde(default)]
    pub steady_positions: usize,
    /// Survival was requested for this run.
    #[serde(default)]
    pub survival: bool,
    #[serde(default)]
    pub survival_rate: Option<f64>,
    #[serde(default)]
    pub survival_bins: usize,
    #[serde(default)]
    pub current_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FolderReport {
    pub fn new(folder: impl Into<String>, status: FolderStatus, fingerprint: &str) -> Self {
        Self {
            folder: folder.into(),
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
            config_fingerprint: fingerprint.to_string(),
            elapsed_s: 0.0,
            slices: 0,
            rejected_slices: 0,
            steady_times: 0,
            steady_positions: 0,
            survival: false,
            survival_rate: None,
            survival_bins: 0,
            current_time: None,
            end_time: None,
            message: None,
        }
    }

    /// True when this report covers a completed run with `fingerprint`.
    pub fn is_current(&self, fingerprint: &str) -> bool {
        matches!(self.status, FolderStatus::Processed | FolderStatus::UpToDate)
            && self.config_fingerprint == fingerprint
    }

    /// The report at `path`, or `None` if absent or unreadable.
    pub fn read(path: &Path) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&text) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable report");
                None
            }
        }
    }

    pub fn write(&self, path: &Path) -> AppResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| AppError::ReportWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postprocess.json");
        let mut report = FolderReport::new("nb3", FolderStatus::Processed, "abc");
        report.slices = 12;
        report.survival_rate = Some(0.97);
        report.write(&path).unwrap();

        let back = FolderReport::read(&path).unwrap();
        assert_eq!(back, report);
        assert!(back.is_current("abc"));
        assert!(!back.is_current("abd"));
        assert!(chrono::DateTime::parse_from_rfc3339(&back.timestamp).is_ok());
    }

    #[test]
    fn failed_reports_are_never_current() {
        let report = FolderReport::new("nb3", FolderStatus::Failed, "abc");
        assert!(!report.is_current("abc"));
    }

    #[test]
    fn unreadable_report_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postprocess.json");
        assert!(FolderReport::read(&path).is_none());
        std::fs::write(&path, "{ not json").unwrap();
        assert!(FolderReport::read(&path).is_none());
    }
}
