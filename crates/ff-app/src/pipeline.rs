//! Per-folder pipeline steps: slice summaries, steady windows, survival.

use ff_core::Deadline;
use ff_folder::{FolderGeometry, PointSet, SimulationFolder};
use ff_series::CurrentTime;
use ff_slices::{SliceRejection, SliceSummarySeries};
use ff_steady::{detect, SteadyMode, SteadyTable};
use ff_survival::SurvivalProfile;

use crate::config::PipelineConfig;
use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub series: SliceSummarySeries,
    pub rejected: Vec<SliceRejection>,
    /// False when an existing summary file was reused.
    pub written: bool,
}

#[derive(Debug, Clone)]
pub struct SteadyOutcome {
    pub table: SteadyTable,
    pub written: bool,
}

#[derive(Debug, Clone)]
pub struct SumAndSteady {
    pub summary: SummaryOutcome,
    pub times: SteadyOutcome,
    pub positions: SteadyOutcome,
}

impl SumAndSteady {
    pub fn written(&self) -> bool {
        self.summary.written || self.times.written || self.positions.written
    }
}

#[derive(Debug, Clone)]
pub struct SurvivalOutcome {
    pub profile: SurvivalProfile,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderTimes {
    pub times: Vec<f64>,
    pub current: CurrentTime,
}

/// Reconciled snapshot times plus the current and end time of a run.
pub fn folder_times(folder: &SimulationFolder) -> AppResult<FolderTimes> {
    let times = ff_series::times(folder)?;
    let current = ff_series::current_time(folder)?;
    Ok(FolderTimes { times, current })
}

/// Slice summaries of a run, reusing `sliceSummaries.csv` unless `overwrite`.
pub fn summarize_folder(
    folder: &SimulationFolder,
    config: &PipelineConfig,
    overwrite: bool,
    deadline: &Deadline,
) -> AppResult<SummaryOutcome> {
    let path = folder.slice_summaries_path();
    if !overwrite && path.exists() {
        tracing::debug!(path = %path.display(), "reusing slice summaries");
        return Ok(SummaryOutcome {
            series: SliceSummarySeries::read(&path)?,
            rejected: Vec::new(),
            written: false,
        });
    }
    let geo = FolderGeometry::read(folder.root())?;
    let (series, rejected) =
        SliceSummarySeries::from_folder(folder, &geo, &config.extractor, deadline)?;
    series.write(&path)?;
    tracing::info!(
        path = %path.display(),
        slices = series.len(),
        rejected = rejected.len(),
        "exported slice summaries"
    );
    Ok(SummaryOutcome {
        series,
        rejected,
        written: true,
    })
}

/// Steady windows of one mode, reusing the existing table unless `overwrite`.
pub fn steady_folder(
    folder: &SimulationFolder,
    series: &SliceSummarySeries,
    mode: SteadyMode,
    config: &PipelineConfig,
    overwrite: bool,
) -> AppResult<SteadyOutcome> {
    let path = match mode {
        SteadyMode::TimeAtPosition => folder.steady_times_path(),
        SteadyMode::PositionAtTime => folder.steady_positions_path(),
    };
    if !overwrite && path.exists() {
        return Ok(SteadyOutcome {
            table: SteadyTable::read(&path, mode)?,
            written: false,
        });
    }
    let steady = &config.steady;
    let windows = detect(series, mode, steady.metric, steady.width(mode), steady.tolerance);
    let table = SteadyTable::new(mode, windows, series.units());
    table.write(&path)?;
    tracing::info!(path = %path.display(), windows = table.windows.len(), "exported steady windows");
    Ok(SteadyOutcome {
        table,
        written: true,
    })
}

/// Slice summaries and both steady tables of a run.
///
/// Returns `None` for runs without interface point exports.
pub fn sum_and_steady(
    folder: &SimulationFolder,
    config: &PipelineConfig,
    overwrite: bool,
    deadline: &Deadline,
) -> AppResult<Option<SumAndSteady>> {
    if !folder.points_dir(PointSet::Interface).is_dir() && !folder.slice_summaries_path().exists() {
        tracing::debug!(folder = %folder.short_name(), "no interface points");
        return Ok(None);
    }
    let summary = summarize_folder(folder, config, overwrite, deadline)?;
    // Fresh summaries invalidate the steady tables.
    let overwrite = overwrite || summary.written;
    let times = steady_folder(folder, &summary.series, SteadyMode::TimeAtPosition, config, overwrite)?;
    let positions =
        steady_folder(folder, &summary.series, SteadyMode::PositionAtTime, config, overwrite)?;
    Ok(Some(SumAndSteady {
        summary,
        times,
        positions,
    }))
}

/// Area-weighted survival across the nozzle at `config.survival.time`.
pub fn survival_folder(
    folder: &SimulationFolder,
    config: &PipelineConfig,
    deadline: &Deadline,
) -> AppResult<SurvivalOutcome> {
    let geo = FolderGeometry::read(folder.root())?;
    let profile = SurvivalProfile::from_folder(folder, &geo, &config.survival, deadline)?;
    let rate = profile.rate();
    tracing::info!(
        folder = %folder.short_name(),
        bins = profile.tracks.len(),
        dropped = profile.dropped.len(),
        rate = ?rate,
        "survival profile"
    );
    Ok(SurvivalOutcome { profile, rate })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_without_interface_points_has_nothing_to_summarise() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("legend.csv"), "nozzle inner width (mm),0.5\n").unwrap();
        let folder = SimulationFolder::open(dir.path()).unwrap();
        let out = sum_and_steady(&folder, &PipelineConfig::default(), false, &Deadline::none()).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn existing_summaries_are_reused() {
        let dir = tempfile::tempdir().unwrap();
        let folder = SimulationFolder::new(dir.path());
        let series = SliceSummarySeries::default();
        series.write(&folder.slice_summaries_path()).unwrap();

        // no legend, so only the reuse path can succeed
        let out = summarize_folder(&folder, &PipelineConfig::default(), false, &Deadline::none()).unwrap();
        assert!(!out.written);
        assert!(out.series.is_empty());
        let err = summarize_folder(&folder, &PipelineConfig::default(), true, &Deadline::none()).unwrap_err();
        assert!(err.is_missing_data());
    }
}
