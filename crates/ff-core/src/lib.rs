//! ff-core: stable foundation for filamentflow.
//!
//! Contains:
//! - error (shared error kinds for every post-processing stage)
//! - numeric (Real + tolerances + float helpers)
//! - units (uom SI types + metre/millimetre ingestion helpers)
//! - deadline (cooperative per-folder time budget)

pub mod deadline;
pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use deadline::Deadline;
pub use error::{FfError, FfResult};
pub use numeric::*;
pub use units::*;
