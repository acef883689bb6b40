//! Shared service layer for filamentflow.
//!
//! Ties the folder, series, slice, steady-state and survival crates into
//! per-folder pipelines and batch runs for the CLI.

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod summary;

pub use batch::{process_folder, process_folders, BatchOptions};
pub use config::PipelineConfig;
pub use error::{AppError, AppResult};
pub use pipeline::{
    folder_times, steady_folder, sum_and_steady, summarize_folder, survival_folder, FolderTimes,
    SteadyOutcome, SumAndSteady, SummaryOutcome, SurvivalOutcome,
};
pub use report::{FolderReport, FolderStatus};
pub use summary::{summary_row, summary_table, summary_table_name};
