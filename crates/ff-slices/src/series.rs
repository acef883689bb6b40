//! The per-folder slice summary series and its `sliceSummaries.csv` table.

use std::path::Path;

use ff_core::Deadline;
use ff_folder::{file_time, FolderGeometry, PointCloud, PointSet, SimulationFolder, Table};

use crate::metric::{SliceMetric, SliceUnits};
use crate::summary::{summarize, ExtractorConfig, SliceRejection, SliceSummaryRecord};
use crate::{SliceError, SliceResult};

/// All slice summaries of one run, ordered by (time, x) with no repeated pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceSummarySeries {
    records: Vec<SliceSummaryRecord>,
    units: SliceUnits,
}

impl SliceSummarySeries {
    pub fn new(mut records: Vec<SliceSummaryRecord>, units: SliceUnits) -> SliceResult<Self> {
        records.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.x.total_cmp(&b.x)));
        if let Some(w) = records
            .windows(2)
            .find(|w| w[0].time == w[1].time && w[0].x == w[1].x)
        {
            return Err(SliceError::Duplicate {
                time: w[0].time,
                x: w[0].x,
            });
        }
        Ok(Self { records, units })
    }

    pub fn records(&self) -> &[SliceSummaryRecord] {
        &self.records
    }

    pub fn units(&self) -> &SliceUnits {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SliceSummaryRecord> {
        self.records.iter()
    }

    /// Summarise every interface point file of a run.
    ///
    /// A run without an interface point folder is `MissingData`.
    pub fn from_folder(
        folder: &SimulationFolder,
        geo: &FolderGeometry,
        config: &ExtractorConfig,
        deadline: &Deadline,
    ) -> SliceResult<(Self, Vec<SliceRejection>)> {
        let threshold = config.exclude_behind.then(|| geo.axial_threshold());
        let mut records = Vec::new();
        let mut rejected = Vec::new();
        let mut units = None;
        for path in folder.point_files(PointSet::Interface)? {
            let cloud = PointCloud::read(&path)?;
            if cloud.is_empty() {
                continue;
            }
            let Some(time) = file_time(&path).or_else(|| cloud.points[0].time) else {
                tracing::warn!(path = %path.display(), "no time for point file");
                continue;
            };
            let out = summarize(&cloud, time, threshold, geo, config, deadline)?;
            tracing::debug!(
                path = %path.display(),
                slices = out.records.len(),
                rejected = out.rejected.len(),
                "summarised point file"
            );
            records.extend(out.records);
            rejected.extend(out.rejected);
            units.get_or_insert_with(|| SliceUnits::from_cloud(&cloud));
        }
        let series = Self::new(records, units.unwrap_or_default())?;
        Ok((series, rejected))
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(
            SliceMetric::ALL.iter().map(|m| m.name().to_string()).collect(),
            self.units.row(),
        );
        for r in &self.records {
            table.push_row(&r.values());
        }
        table
    }

    pub fn from_table(table: &Table) -> Result<Self, String> {
        let mut columns = [0usize; 18];
        for (slot, metric) in columns.iter_mut().zip(SliceMetric::ALL) {
            *slot = table
                .column_index(metric.name())
                .ok_or_else(|| format!("missing column {metric}"))?;
        }
        let units = SliceUnits {
            length: table.unit(columns[SliceMetric::X.index()]).to_string(),
            time: table.unit(columns[SliceMetric::Time.index()]).to_string(),
            speed: table.unit(columns[SliceMetric::Speed.index()]).to_string(),
        };

        let mut records = Vec::with_capacity(table.rows.len());
        'rows: for row in &table.rows {
            let mut values = [0.0; 18];
            for (value, (col, metric)) in values.iter_mut().zip(columns.iter().zip(SliceMetric::ALL)) {
                match row[*col].trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => *value = v,
                    // rows with blank or non-numeric cells are dropped
                    _ => {
                        tracing::debug!(column = %metric, cell = %row[*col], "dropped slice row");
                        continue 'rows;
                    }
                }
            }
            records.push(SliceSummaryRecord::from_values(values));
        }
        Self::new(records, units).map_err(|e| e.to_string())
    }

    pub fn write(&self, path: &Path) -> SliceResult<()> {
        Ok(self.to_table().write(path)?)
    }

    pub fn read(path: &Path) -> SliceResult<Self> {
        if !path.exists() {
            return Err(ff_core::FfError::missing(format!("slice summaries {}", path.display())).into());
        }
        let table = Table::read(path)?;
        Self::from_table(&table).map_err(|message| SliceError::Table {
            path: path.to_path_buf(),
            message,
        })
    }
}
