//! Error types for the ff-app service layer.

use std::path::PathBuf;

/// Application error wrapping the backend crates' errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Nothing to process yet: no legend, no point exports, no summaries.
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Folder error: {0}")]
    Folder(String),

    #[error("Time series error: {0}")]
    Series(String),

    #[error("Slice summary error: {0}")]
    Slices(String),

    #[error("Steady state error: {0}")]
    Steady(String),

    #[error("Survival error: {0}")]
    Survival(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Failed to write report: {path}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ff-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn is_missing_data(&self) -> bool {
        matches!(self, AppError::MissingData(_))
    }
}

impl From<ff_core::FfError> for AppError {
    fn from(err: ff_core::FfError) -> Self {
        match err {
            ff_core::FfError::MissingData { .. } => AppError::MissingData(err.to_string()),
            ff_core::FfError::Timeout { .. } => AppError::Timeout(err.to_string()),
            ff_core::FfError::InvalidArg { .. } => AppError::Config(err.to_string()),
            _ => AppError::InvalidInput(err.to_string()),
        }
    }
}

impl From<ff_folder::FolderError> for AppError {
    fn from(err: ff_folder::FolderError) -> Self {
        match err {
            ff_folder::FolderError::Core(e) => e.into(),
            other => AppError::Folder(other.to_string()),
        }
    }
}

impl From<ff_series::SeriesError> for AppError {
    fn from(err: ff_series::SeriesError) -> Self {
        match err {
            ff_series::SeriesError::Core(e) => e.into(),
            ff_series::SeriesError::Folder(e) => e.into(),
            other => AppError::Series(other.to_string()),
        }
    }
}

impl From<ff_slices::SliceError> for AppError {
    fn from(err: ff_slices::SliceError) -> Self {
        match err {
            ff_slices::SliceError::Core(e) => e.into(),
            ff_slices::SliceError::Folder(e) => e.into(),
            other => AppError::Slices(other.to_string()),
        }
    }
}

impl From<ff_steady::SteadyError> for AppError {
    fn from(err: ff_steady::SteadyError) -> Self {
        match err {
            ff_steady::SteadyError::Core(e) => e.into(),
            ff_steady::SteadyError::Folder(e) => e.into(),
            ff_steady::SteadyError::Slices(e) => e.into(),
            other => AppError::Steady(other.to_string()),
        }
    }
}

impl From<ff_survival::SurvivalError> for AppError {
    fn from(err: ff_survival::SurvivalError) -> Self {
        match err {
            ff_survival::SurvivalError::Core(e) => e.into(),
            ff_survival::SurvivalError::Folder(e) => e.into(),
        }
    }
}
