use thiserror::Error;

pub type FfResult<T> = Result<T, FfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FfError {
    /// Nothing to process: no manifest, no point-cloud folder, no legend.
    #[error("Missing data: {what}")]
    MissingData { what: String },

    #[error("Insufficient samples: needed {needed}, found {found}")]
    InsufficientSamples { needed: usize, found: usize },

    #[error("Degenerate geometry: {what}")]
    DegenerateGeometry { what: &'static str },

    #[error("Unit mismatch for {quantity}: expected {expected}, found {found}")]
    UnitMismatch {
        quantity: String,
        expected: String,
        found: String,
    },

    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },

    #[error("Time budget of {budget_s:.1}s exceeded during {stage}")]
    Timeout { stage: &'static str, budget_s: f64 },
}

impl FfError {
    pub fn missing(what: impl Into<String>) -> Self {
        FfError::MissingData { what: what.into() }
    }

    /// True for failures local to one slice or bin, which callers skip
    /// instead of aborting the whole folder.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            FfError::InsufficientSamples { .. }
                | FfError::DegenerateGeometry { .. }
                | FfError::NonFinite { .. }
        )
    }
}
