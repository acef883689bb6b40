//! ff-folder: simulation folder layout, metadata legend and point-cloud tables.

pub mod cloud;
pub mod geometry;
pub mod layout;
pub mod legend;
pub mod rheology;
pub mod table;

pub use cloud::{PointCloud, PointRecord};
pub use geometry::FolderGeometry;
pub use layout::{case_folders, file_time, PointSet, SimulationFolder};
pub use legend::{Legend, LegendBuilder, LegendEntry};
pub use rheology::{Fluid, FluidState, RheologySummary};
pub use table::Table;

use std::path::PathBuf;

pub type FolderResult<T> = Result<T, FolderError>;

#[derive(thiserror::Error, Debug)]
pub enum FolderError {
    #[error(transparent)]
    Core(#[from] ff_core::FfError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed table {path}: {message}")]
    Table { path: PathBuf, message: String },

    #[error("Duplicate legend key: {0}")]
    DuplicateKey(String),

    #[error("Legend key {key} is not numeric: {value}")]
    NotNumeric { key: String, value: String },
}

impl FolderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FolderError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the folder simply has nothing to process yet.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, FolderError::Core(ff_core::FfError::MissingData { .. }))
    }
}
