//! Snapshot files written by the visualisation export.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use regex::Regex;

use crate::{SeriesError, SeriesResult};

/// Time increment assumed between `.vtk` snapshots, which carry no time.
pub const VTK_TIME_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotFormat {
    /// Multiblock files with an embedded time value.
    Vtm,
    /// Legacy files, numbered but untimed.
    Vtk,
}

impl SnapshotFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Vtm => ".vtm",
            SnapshotFormat::Vtk => ".vtk",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "vtm" => Some(SnapshotFormat::Vtm),
            "vtk" => Some(SnapshotFormat::Vtk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub path: PathBuf,
    pub format: SnapshotFormat,
    /// Solver output folder label, e.g. `"25"`.
    pub label: String,
    /// Embedded time; `None` for formats that carry no time.
    pub time: Option<f64>,
    pub modified: SystemTime,
}

fn label_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_|/internal").expect("static regex"))
}

fn vtk_name_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_|\.v").expect("static regex"))
}

/// Label and raw time line of a `.vtm` file.
///
/// The label is the token after the first `_` on the first `DataSet name=`
/// line; the time is the line following the first `TimeValue` line after it.
pub fn parse_vtm(text: &str) -> Option<(String, String)> {
    let mut lines = text.lines();
    let dataset = lines.by_ref().find(|l| l.contains("DataSet name="))?;
    let label = label_splitter().split(dataset).nth(1)?.to_string();
    lines.by_ref().find(|l| l.contains("TimeValue"))?;
    let time = lines.next()?.trim().to_string();
    Some((label, time))
}

/// Integer label from a `.vtk` file name such as `case_12.vtk`.
pub fn parse_vtk_label(file_name: &str) -> Option<i64> {
    vtk_name_splitter().split(file_name).nth(1)?.parse().ok()
}

/// The solver sometimes stamps the initial (`0`) snapshot with the time of
/// the first write. Rewrites such a file's time value to `0`.
///
/// Returns `true` when the file was changed. Already-corrected files are left
/// untouched.
pub fn correct_initial_time(path: &Path) -> SeriesResult<bool> {
    let text = std::fs::read_to_string(path).map_err(|e| SeriesError::io(path, e))?;
    let Some(corrected) = corrected_vtm_text(&text) else {
        return Ok(false);
    };
    std::fs::write(path, corrected).map_err(|e| SeriesError::io(path, e))?;
    tracing::warn!(path = %path.display(), "reset initial snapshot time to 0");
    Ok(true)
}

/// Text with the time line of a label-`0` snapshot replaced by `0`, or `None`
/// if no correction is needed.
pub(crate) fn corrected_vtm_text(text: &str) -> Option<String> {
    let (label, time) = parse_vtm(text)?;
    if label != "0" || time.parse::<f64>().is_ok_and(|t| t == 0.0) {
        return None;
    }
    let lines: Vec<&str> = text.lines().collect();
    let dataset = lines.iter().position(|l| l.contains("DataSet name="))?;
    let marker = dataset + lines[dataset..].iter().position(|l| l.contains("TimeValue"))?;
    let mut lines = lines;
    *lines.get_mut(marker + 1)? = "0";
    let mut joined = lines.join("\n");
    if text.ends_with('\n') {
        joined.push('\n');
    }
    Some(joined)
}

impl Snapshot {
    /// Label and embedded time of a snapshot file, without correcting it.
    /// `Ok(None)` for files that are not snapshots or carry no usable label
    /// or time.
    pub fn peek(path: &Path) -> SeriesResult<Option<(String, Option<f64>)>> {
        let Some(format) = SnapshotFormat::from_path(path) else {
            return Ok(None);
        };
        match format {
            SnapshotFormat::Vtm => {
                let text = std::fs::read_to_string(path).map_err(|e| SeriesError::io(path, e))?;
                let Some((label, raw_time)) = parse_vtm(&text) else {
                    tracing::debug!(path = %path.display(), "no label/time in snapshot");
                    return Ok(None);
                };
                let Ok(time) = raw_time.parse::<f64>() else {
                    tracing::debug!(path = %path.display(), raw_time, "non-numeric snapshot time");
                    return Ok(None);
                };
                Ok(Some((label, Some(time))))
            }
            SnapshotFormat::Vtk => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(parse_vtk_label(&name).map(|label| (label.to_string(), None)))
            }
        }
    }

    /// Read one snapshot file, resetting a stamped initial time. Returns
    /// `Ok(None)` for files that are not snapshots or whose label cannot be
    /// recovered.
    pub fn read(path: &Path) -> SeriesResult<Option<Self>> {
        let Some(format) = SnapshotFormat::from_path(path) else {
            return Ok(None);
        };
        let Some((label, mut time)) = Self::peek(path)? else {
            tracing::warn!(path = %path.display(), "skipping malformed snapshot");
            return Ok(None);
        };
        if label == "0" && time.is_some_and(|t| t != 0.0) {
            correct_initial_time(path)?;
            time = Some(0.0);
        }
        Ok(Some(Snapshot {
            path: path.to_path_buf(),
            format,
            label,
            time,
            modified: crate::manifest::modified(path)?,
        }))
    }
}

/// Times for untimed snapshots: 0, 0.1, 0.2, ... in numeric label order.
pub fn synthesize_times(labels: &[String]) -> Vec<(String, f64)> {
    let mut sorted: Vec<&String> = labels.iter().collect();
    sorted.sort_by_key(|l| (l.parse::<i64>().unwrap_or(i64::MAX), (*l).clone()));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, l)| (l.clone(), ff_core::round_to(i as f64 * VTK_TIME_STEP, 1)))
        .collect()
}
