//! ff-survival: survival of material carried through the nozzle.
//!
//! Material is assumed to survive a step of length `dt` under shear stress
//! `tau` with probability `exp(-a * tau^b * dt^c)`. Nozzle points in the
//! central plane are binned by normalised radius and each bin is followed
//! from the nozzle inlet to its tip, multiplying up the per-step survival.

pub mod law;
pub mod profile;
pub mod track;

pub use law::{SurvivalConfig, SurvivalLaw};
pub use profile::{survival_by_radius, PlaneSample, SurvivalProfile};
pub use track::{StepOutcome, SurvivalStep, SurvivalTrack};

pub type SurvivalResult<T> = Result<T, SurvivalError>;

#[derive(thiserror::Error, Debug)]
pub enum SurvivalError {
    #[error(transparent)]
    Folder(#[from] ff_folder::FolderError),

    #[error(transparent)]
    Core(#[from] ff_core::FfError),
}

impl SurvivalError {
    pub fn is_missing_data(&self) -> bool {
        match self {
            SurvivalError::Core(e) => matches!(e, ff_core::FfError::MissingData { .. }),
            SurvivalError::Folder(e) => e.is_missing_data(),
        }
    }
}
