//! ff-series: canonical time series of a simulation's output snapshots.
//!
//! The solver's visualisation export writes one `.vtm` (multiblock) or `.vtk`
//! file per output time, plus a `.series` manifest listing them in time order.
//! The manifest goes stale while a run is in progress, so it is checked
//! against the snapshot files on disk and regenerated when needed.

pub mod manifest;
pub mod reconcile;
pub mod snapshot;

pub use manifest::{MANIFEST_VERSION, Manifest, ManifestEntry};
pub use reconcile::{current_time, folder_times, manifest_times, regenerate, times, CurrentTime};
pub use snapshot::{Snapshot, SnapshotFormat, correct_initial_time};

use std::path::PathBuf;

pub type SeriesResult<T> = Result<T, SeriesError>;

#[derive(thiserror::Error, Debug)]
pub enum SeriesError {
    #[error(transparent)]
    Folder(#[from] ff_folder::FolderError),

    #[error(transparent)]
    Core(#[from] ff_core::FfError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unsupported manifest version {found} (expected {expected})")]
    UnsupportedVersion { found: String, expected: &'static str },
}

impl SeriesError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SeriesError::Io {
            path: path.into(),
            source,
        }
    }
}
