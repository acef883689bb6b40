//! `steadyTimes.csv` and `steadyPositions.csv`.

use std::path::Path;

use ff_folder::Table;
use ff_slices::SliceUnits;

use crate::window::{SteadyMode, SteadyWindow};
use crate::{SteadyError, SteadyResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SteadyTable {
    pub mode: SteadyMode,
    pub windows: Vec<SteadyWindow>,
    /// Units of the group, start and end columns.
    pub units: [String; 3],
}

impl SteadyTable {
    pub fn new(mode: SteadyMode, windows: Vec<SteadyWindow>, units: &SliceUnits) -> Self {
        let group = units.unit(mode.group_metric());
        let scan = units.unit(mode.scan_metric());
        Self {
            mode,
            windows,
            units: [group, scan.clone(), scan],
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(
            self.mode.columns().map(str::to_string).to_vec(),
            self.units.to_vec(),
        );
        for w in &self.windows {
            table.push_row(&[w.group, w.start, w.end]);
        }
        table
    }

    pub fn write(&self, path: &Path) -> SteadyResult<()> {
        Ok(self.to_table().write(path)?)
    }

    pub fn read(path: &Path, mode: SteadyMode) -> SteadyResult<Self> {
        if !path.exists() {
            return Err(ff_core::FfError::missing(format!("steady table {}", path.display())).into());
        }
        let table = Table::read(path)?;
        let malformed = |message: String| SteadyError::Table {
            path: path.to_path_buf(),
            message,
        };
        let mut cols = [0usize; 3];
        for (slot, name) in cols.iter_mut().zip(mode.columns()) {
            *slot = table
                .column_index(name)
                .ok_or_else(|| malformed(format!("missing column {name}")))?;
        }
        let mut windows = Vec::with_capacity(table.rows.len());
        for (i, row) in table.rows.iter().enumerate() {
            let mut v = [0.0; 3];
            for (value, col) in v.iter_mut().zip(cols) {
                *value = row[col]
                    .trim()
                    .parse()
                    .map_err(|_| malformed(format!("row {}: bad number {:?}", i + 1, row[col])))?;
            }
            windows.push(SteadyWindow {
                group: v[0],
                start: v[1],
                end: v[2],
            });
        }
        Ok(Self {
            mode,
            windows,
            units: cols.map(|c| table.unit(c).to_string()),
        })
    }

    /// The window recorded for `group`, if any.
    pub fn window_for(&self, group: f64) -> Option<&SteadyWindow> {
        self.windows.iter().find(|w| w.group == ff_core::round_to(group, 3))
    }
}
