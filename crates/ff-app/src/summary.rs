//! Cross-folder summary table at one (time, xbehind).

use std::path::{Path, PathBuf};

use ff_folder::{case_folders, FolderGeometry, Legend, RheologySummary, SimulationFolder, Table};
use ff_slices::{metric_values, MetricValue, SliceMetric, SliceSummarySeries};

use crate::error::AppResult;

/// One folder's row: rheology of both fluids and every slice metric.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub folder: String,
    pub rheology: RheologySummary,
    pub metrics: Vec<MetricValue>,
}

const RHEOLOGY_COLUMNS: [(&str, &str); 8] = [
    ("visc0_ink", "Pa*s"),
    ("visc0_sup", "Pa*s"),
    ("gdot_ink", "1/s"),
    ("gdot_sup", "1/s"),
    ("Re_ink", ""),
    ("Re_sup", ""),
    ("viscRatio", ""),
    ("ReRatio", ""),
];

impl SummaryRow {
    fn rheology_values(&self) -> [f64; 8] {
        let r = &self.rheology;
        [
            r.ink.viscosity,
            r.sup.viscosity,
            r.ink.shear_rate,
            r.sup.shear_rate,
            r.ink.reynolds,
            r.sup.reynolds,
            r.viscosity_ratio(),
            r.reynolds_ratio(),
        ]
    }
}

pub fn summary_table_name(time: f64, xbehind: f64) -> String {
    format!("summaryTable_x_{xbehind}_t_{time}.csv")
}

/// Summary row of one folder; fails if the folder has no slice at the request.
pub fn summary_row(folder: &SimulationFolder, time: f64, xbehind: f64) -> AppResult<SummaryRow> {
    let legend = Legend::read(folder.root())?;
    let geo = FolderGeometry::from_legend(&legend)?;
    let rheology = RheologySummary::from_legend(&legend, &geo)?;
    let series = SliceSummarySeries::read(&folder.slice_summaries_path())?;
    let metrics = metric_values(&series, time, xbehind, &SliceMetric::ALL)?;
    Ok(SummaryRow {
        folder: folder.name(),
        rheology,
        metrics,
    })
}

/// Collect a row from every run below each of `tops`.
///
/// Folders that cannot produce a row are left out. When `export_dir` exists
/// the table is written there as `summaryTable_x_{xbehind}_t_{time}.csv`.
pub fn summary_table(
    tops: &[PathBuf],
    time: f64,
    xbehind: f64,
    export_dir: Option<&Path>,
) -> AppResult<Table> {
    let mut rows = Vec::new();
    for top in tops {
        tracing::info!(top = %top.display(), "collecting summary rows");
        for folder in case_folders(top)? {
            match summary_row(&folder, time, xbehind) {
                Ok(row) => rows.push(row),
                Err(e) => tracing::debug!(folder = %folder.short_name(), error = %e, "no summary row"),
            }
        }
    }

    let units = rows
        .first()
        .map(|r| r.metrics.iter().map(|m| m.unit.clone()).collect::<Vec<_>>())
        .unwrap_or_else(|| SliceMetric::ALL.iter().map(|m| m.unit()).collect());
    let mut columns = vec!["folder".to_string()];
    let mut unit_row = vec![String::new()];
    for (name, unit) in RHEOLOGY_COLUMNS {
        columns.push(name.to_string());
        unit_row.push(unit.to_string());
    }
    columns.extend(SliceMetric::ALL.iter().map(|m| m.name().to_string()));
    unit_row.extend(units);

    let mut table = Table::new(columns, unit_row);
    for row in &rows {
        let mut cells = vec![row.folder.clone()];
        cells.extend(row.rheology_values().iter().map(|v| format!("{v}")));
        cells.extend(row.metrics.iter().map(|m| format!("{}", m.value)));
        table.rows.push(cells);
    }

    if let Some(dir) = export_dir.filter(|d| d.is_dir()) {
        table.write(&dir.join(summary_table_name(time, xbehind)))?;
    }
    Ok(table)
}
