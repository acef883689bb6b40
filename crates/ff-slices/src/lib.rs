//! ff-slices: cross-section summaries of the extruded filament.
//!
//! Each interface point cloud is cut into slices of equal axial position.
//! A slice's convex hull gives its centroid and area; its extents give height
//! and width. Results are normalised by the nozzle inner width and collected
//! into a [`SliceSummarySeries`] persisted as `sliceSummaries.csv`.

pub mod hull;
pub mod metric;
pub mod query;
pub mod series;
pub mod summary;

pub use metric::{SliceMetric, SliceUnits};
pub use query::{metric_values, MetricValue, MAX_POSITION_GAP};
pub use series::SliceSummarySeries;
pub use summary::{summarize, summarize_slice, ExtractorConfig, SliceExtraction, SliceRejection, SliceSummaryRecord};

use std::path::PathBuf;

pub type SliceResult<T> = Result<T, SliceError>;

#[derive(thiserror::Error, Debug)]
pub enum SliceError {
    #[error(transparent)]
    Folder(#[from] ff_folder::FolderError),

    #[error(transparent)]
    Core(#[from] ff_core::FfError),

    #[error("Malformed slice summary table {path}: {message}")]
    Table { path: PathBuf, message: String },

    #[error("Duplicate slice at time {time}, x {x}")]
    Duplicate { time: f64, x: f64 },

    #[error("Unknown slice metric: {0}")]
    UnknownMetric(String),
}

impl SliceError {
    /// True when the folder simply has nothing to summarise.
    pub fn is_missing_data(&self) -> bool {
        match self {
            SliceError::Core(e) => matches!(e, ff_core::FfError::MissingData { .. }),
            SliceError::Folder(e) => e.is_missing_data(),
            _ => false,
        }
    }
}
