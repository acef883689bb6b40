//! Reconcile the manifest, the snapshot files and the solver time folders
//! into one ordered list of simulation times.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ff_core::unique_sorted;
use ff_folder::{Legend, SimulationFolder};

use crate::manifest::{modified, Manifest};
use crate::snapshot::{synthesize_times, Snapshot, SnapshotFormat};
use crate::{SeriesError, SeriesResult};

const LOCK_FILE: &str = ".series.lock";

/// Snapshot files present in a VTK folder, without reading their contents.
#[derive(Debug, Clone)]
struct SnapshotFiles {
    format: SnapshotFormat,
    paths: Vec<PathBuf>,
    newest: Option<SystemTime>,
}

fn list_dir(dir: &Path) -> SeriesResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| SeriesError::io(dir, e))? {
        let entry = entry.map_err(|e| SeriesError::io(dir, e))?;
        out.push(entry.path());
    }
    out.sort();
    Ok(out)
}

fn snapshot_files(vtk: &Path) -> SeriesResult<SnapshotFiles> {
    let entries = list_dir(vtk)?;
    let mut vtm = Vec::new();
    let mut vtk_files = Vec::new();
    let mut newest: Option<SystemTime> = None;
    for path in entries {
        let Some(format) = SnapshotFormat::from_path(&path) else {
            continue;
        };
        let m = modified(&path)?;
        newest = Some(newest.map_or(m, |n| n.max(m)));
        match format {
            SnapshotFormat::Vtm => vtm.push(path),
            SnapshotFormat::Vtk => vtk_files.push(path),
        }
    }
    // legacy exports win when both kinds are present
    let (format, paths) = if vtk_files.is_empty() {
        (SnapshotFormat::Vtm, vtm)
    } else {
        (SnapshotFormat::Vtk, vtk_files)
    };
    Ok(SnapshotFiles {
        format,
        paths,
        newest,
    })
}

fn find_manifest(vtk: &Path) -> SeriesResult<Option<PathBuf>> {
    Ok(list_dir(vtk)?.into_iter().find(|p| {
        p.file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(".series"))
    }))
}

/// Entries a regenerated manifest would hold: one per distinct time among
/// the snapshot files that parse.
fn expected_entries(files: &SnapshotFiles) -> SeriesResult<usize> {
    let mut times = Vec::with_capacity(files.paths.len());
    let mut labels = 0;
    for path in &files.paths {
        let Some((label, time)) = Snapshot::peek(path)? else {
            continue;
        };
        labels += 1;
        if let Some(t) = time {
            times.push(if label == "0" { 0.0 } else { t });
        }
    }
    Ok(match files.format {
        SnapshotFormat::Vtm => unique_sorted(times).len(),
        SnapshotFormat::Vtk => labels,
    })
}

/// Stale when any snapshot is newer, or it lists fewer entries than the
/// valid snapshots on disk would give.
fn is_stale(path: &Path, manifest: &Manifest, files: &SnapshotFiles) -> SeriesResult<bool> {
    let written = modified(path)?;
    if files.newest.is_some_and(|newest| newest > written) {
        return Ok(true);
    }
    Ok(manifest.len() < expected_entries(files)?)
}

/// The existing manifest, if present, readable and fresh.
fn fresh_manifest(vtk: &Path) -> SeriesResult<Option<Manifest>> {
    let Some(path) = find_manifest(vtk)? else {
        return Ok(None);
    };
    let manifest = match Manifest::read(&path) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable manifest");
            return Ok(None);
        }
    };
    let files = snapshot_files(vtk)?;
    if is_stale(&path, &manifest, &files)? {
        tracing::info!(
            path = %path.display(),
            listed = manifest.len(),
            on_disk = files.paths.len(),
            "manifest is stale"
        );
        return Ok(None);
    }
    Ok(Some(manifest))
}

/// Run `f` holding the folder's exclusive manifest lock.
fn with_manifest_lock<T>(vtk: &Path, f: impl FnOnce() -> SeriesResult<T>) -> SeriesResult<T> {
    let path = vtk.join(LOCK_FILE);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .map_err(|e| SeriesError::io(&path, e))?;
    let mut lock = fd_lock::RwLock::new(file);
    let _guard = lock.write().map_err(|e| SeriesError::io(&path, e))?;
    f()
}

/// Rebuild the manifest from the snapshot files. Caller holds the lock.
fn write_manifest(folder: &SimulationFolder, vtk: &Path) -> SeriesResult<Option<Manifest>> {
    let files = snapshot_files(vtk)?;
    if files.paths.is_empty() {
        return Ok(None);
    }
    let mut snapshots = Vec::with_capacity(files.paths.len());
    for path in &files.paths {
        if let Some(s) = Snapshot::read(path)? {
            snapshots.push(s);
        }
    }

    let pairs: Vec<(String, f64)> = match files.format {
        SnapshotFormat::Vtm => snapshots
            .into_iter()
            .filter_map(|s| s.time.map(|t| (s.label, t)))
            .collect(),
        SnapshotFormat::Vtk => {
            let labels: Vec<String> = snapshots.into_iter().map(|s| s.label).collect();
            synthesize_times(&labels)
        }
    };
    if pairs.is_empty() {
        return Ok(None);
    }

    let existing = find_manifest(vtk)?;
    let base = manifest_base(existing.as_deref(), folder, files.format);
    let manifest = Manifest::from_labels(&base, files.format, &pairs);
    let path = vtk.join(Manifest::file_name(&base, files.format));
    manifest.write(&path)?;
    if let Some(old) = existing.filter(|old| *old != path) {
        std::fs::remove_file(&old).map_err(|e| SeriesError::io(&old, e))?;
    }
    Ok(Some(manifest))
}

/// Entry-name prefix: taken from an existing manifest, else the case folder name.
fn manifest_base(existing: Option<&Path>, folder: &SimulationFolder, format: SnapshotFormat) -> String {
    let suffix = format!("{}.series", format.extension());
    if let Some(name) = existing
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        && let Some(base) = name.strip_suffix(&suffix)
    {
        return base.to_string();
    }
    folder
        .case_folder()
        .unwrap_or_else(|| folder.root().to_path_buf())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "case".to_string())
}

/// Force regeneration of a folder's manifest.
pub fn regenerate(folder: &SimulationFolder) -> SeriesResult<Option<Manifest>> {
    let vtk = folder
        .vtk_folder()
        .ok_or_else(|| ff_core::FfError::missing(format!("VTK folder in {}", folder.root().display())))?;
    with_manifest_lock(&vtk, || write_manifest(folder, &vtk))
}

/// Times listed in the manifest, regenerating it first when missing or stale.
pub fn manifest_times(folder: &SimulationFolder) -> SeriesResult<Vec<f64>> {
    let Some(vtk) = folder.vtk_folder() else {
        return Ok(Vec::new());
    };
    if let Some(m) = fresh_manifest(&vtk)? {
        return Ok(m.times());
    }
    let manifest = with_manifest_lock(&vtk, || {
        // another writer may have finished while we waited
        if let Some(m) = fresh_manifest(&vtk)? {
            return Ok(Some(m));
        }
        write_manifest(folder, &vtk)
    })?;
    Ok(manifest.map(|m| m.times()).unwrap_or_default())
}

/// Times from numerically named solver output folders, ascending.
pub fn folder_times(folder: &SimulationFolder) -> SeriesResult<Vec<f64>> {
    let Some(case) = folder.case_folder() else {
        return Ok(Vec::new());
    };
    let mut times: Vec<f64> = list_dir(&case)?
        .into_iter()
        .filter(|p| p.is_dir())
        .filter_map(|p| p.file_name()?.to_str()?.parse::<f64>().ok())
        .collect();
    times.sort_by(f64::total_cmp);
    Ok(times)
}

/// Ordered simulation times of a folder.
///
/// The solver time folders can outnumber manifest entries mid-run, so the
/// longer of the two lists wins; the manifest is never rewritten from the
/// folder listing. Empty when the run has produced nothing yet.
pub fn times(folder: &SimulationFolder) -> SeriesResult<Vec<f64>> {
    let from_folders = folder_times(folder)?;
    let from_manifest = manifest_times(folder)?;
    tracing::debug!(
        folder = %folder.short_name(),
        folders = from_folders.len(),
        manifest = from_manifest.len(),
        "reconciled times"
    );
    if from_folders.len() > from_manifest.len() {
        Ok(from_folders)
    } else {
        Ok(from_manifest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurrentTime {
    /// Latest simulated time.
    pub simulation_time: Option<f64>,
    pub end_time: Option<f64>,
}

/// Latest simulated time and the configured end time.
///
/// Falls back to the legend's recorded simulation time when no snapshots or
/// time folders exist.
pub fn current_time(folder: &SimulationFolder) -> SeriesResult<CurrentTime> {
    let legend = match Legend::read(folder.root()) {
        Ok(le) => Some(le),
        Err(e) if e.is_missing_data() => None,
        Err(e) => return Err(e.into()),
    };
    let legend_value = |keys: &[&str]| {
        legend
            .as_ref()
            .and_then(|le| le.first_of(keys))
            .and_then(|(_, e)| e.value.trim().parse::<f64>().ok())
    };

    let times = times(folder)?;
    let simulation_time = times
        .iter()
        .copied()
        .reduce(f64::max)
        .or_else(|| legend_value(&["simulation_time", "simulation_time_s"]));
    let end_time = legend_value(&["endTime", "endTime_s", "controlDict_endTime"]);
    Ok(CurrentTime {
        simulation_time,
        end_time,
    })
}
