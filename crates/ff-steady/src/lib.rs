//! ff-steady: steady-state windows in slice summary series.
//!
//! For every distinct position (or time) the summaries are scanned along
//! time (or position) for the first stretch over which a metric's spread
//! stays within a tolerance.

pub mod table;
pub mod window;

pub use table::SteadyTable;
pub use window::{detect, detect_observations, Observation, SteadyConfig, SteadyMode, SteadyWindow, OPEN_END};

use std::path::PathBuf;

pub type SteadyResult<T> = Result<T, SteadyError>;

#[derive(thiserror::Error, Debug)]
pub enum SteadyError {
    #[error(transparent)]
    Folder(#[from] ff_folder::FolderError),

    #[error(transparent)]
    Core(#[from] ff_core::FfError),

    #[error(transparent)]
    Slices(#[from] ff_slices::SliceError),

    #[error("Malformed steady window table {path}: {message}")]
    Table { path: PathBuf, message: String },
}
