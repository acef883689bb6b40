//! Folder metadata legend.
//!
//! `legend.csv` is written by the external scraping tool as rows of
//! `key,value[,unit]`, where the key may carry its unit as a ` (unit)` suffix.
//! Rows are grouped into sections; a blank row followed by a title row, or one
//! of the bare section markers, starts a new section. The same raw key may
//! appear in several sections (`rho` for ink and for support), so repeated
//! keys are qualified with their section before the builder enforces
//! uniqueness.

use std::collections::HashMap;
use std::path::Path;

use ff_core::FfError;

use crate::table::Table;
use crate::{FolderError, FolderResult};

const SECTION_MARKERS: [&str; 4] = ["sup", "ink", "controlDict", "dynamicMeshDict"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub value: String,
    pub unit: String,
}

/// Ordered key → (value, unit) mapping with unique keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Legend {
    entries: Vec<(String, LegendEntry)>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Default)]
pub struct LegendBuilder {
    legend: Legend,
}

impl LegendBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        unit: impl Into<String>,
    ) -> FolderResult<&mut Self> {
        let key = key.into();
        if self.legend.index.contains_key(&key) {
            return Err(FolderError::DuplicateKey(key));
        }
        self.legend
            .index
            .insert(key.clone(), self.legend.entries.len());
        self.legend.entries.push((
            key,
            LegendEntry {
                value: value.into(),
                unit: unit.into(),
            },
        ));
        Ok(self)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.legend.index.contains_key(key)
    }

    pub fn build(self) -> Legend {
        self.legend
    }
}

impl Legend {
    pub fn builder() -> LegendBuilder {
        LegendBuilder::new()
    }

    /// Read `legend.csv` from a simulation folder.
    pub fn read(folder: &Path) -> FolderResult<Self> {
        let path = folder.join(crate::layout::LEGEND_FILE);
        if !path.exists() {
            return Err(FfError::missing(format!("legend file {}", path.display())).into());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| FolderError::io(&path, e))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> FolderResult<Self> {
        let rows = raw_rows(text);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in &rows {
            if let RawRow::Entry { key, .. } = row {
                *counts.entry(key.as_str()).or_default() += 1;
            }
        }

        let mut builder = LegendBuilder::new();
        let mut section = String::new();
        let mut pending_title = false;
        for row in &rows {
            match row {
                RawRow::Blank => pending_title = true,
                RawRow::Entry { key, value, unit } => {
                    if pending_title {
                        pending_title = false;
                        section = key.clone();
                        if value.is_empty() {
                            continue;
                        }
                    } else if SECTION_MARKERS.contains(&key.as_str()) {
                        section = key.clone();
                        continue;
                    }
                    let name = unique_name(&builder, key, &section, unit, counts[key.as_str()]);
                    builder.insert(name, value.clone(), unit.clone())?;
                }
            }
        }
        Ok(builder.build())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LegendEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn get(&self, key: &str) -> Option<&LegendEntry> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(|e| e.value.as_str())
    }

    pub fn unit(&self, key: &str) -> Option<&str> {
        self.get(key).map(|e| e.unit.as_str())
    }

    /// Numeric value for `key`; missing keys are `MissingData`.
    pub fn get_f64(&self, key: &str) -> FolderResult<f64> {
        let entry = self
            .get(key)
            .ok_or_else(|| FfError::missing(format!("legend key {key}")))?;
        entry
            .value
            .trim()
            .parse::<f64>()
            .map_err(|_| FolderError::NotNumeric {
                key: key.to_string(),
                value: entry.value.clone(),
            })
    }

    /// First key in `candidates` present in the legend.
    pub fn first_of<'a>(&'a self, candidates: &[&str]) -> Option<(&'a str, &'a LegendEntry)> {
        candidates
            .iter()
            .find_map(|c| self.index.get(*c).map(|&i| (self.entries[i].0.as_str(), &self.entries[i].1)))
    }

    /// Write back as a three-column table.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(
            vec!["key".into(), "value".into(), "unit".into()],
            vec![String::new(); 3],
        );
        for (key, entry) in &self.entries {
            table
                .rows
                .push(vec![key.clone(), entry.value.clone(), entry.unit.clone()]);
        }
        table
    }
}

enum RawRow {
    Blank,
    Entry {
        key: String,
        value: String,
        unit: String,
    },
}

fn raw_rows(text: &str) -> Vec<RawRow> {
    text.lines()
        .map(|line| {
            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            let raw_key = cells.first().copied().unwrap_or("");
            if raw_key.is_empty() {
                return RawRow::Blank;
            }
            let (key, key_unit) = split_key_unit(raw_key);
            let value = cells.get(1).copied().unwrap_or("").to_string();
            let unit = cells
                .get(2)
                .copied()
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .unwrap_or(key_unit);
            RawRow::Entry { key, value, unit }
        })
        .collect()
}

/// `"nozzle inner width (mm)"` → `("nozzle_inner_width", "mm")`.
fn split_key_unit(raw: &str) -> (String, String) {
    let (name, unit) = match raw.split_once(" (") {
        Some((name, rest)) => (name, rest.trim_end_matches(')').to_string()),
        None => (raw, String::new()),
    };
    (name.trim().replace(' ', "_"), unit)
}

fn unique_name(
    builder: &LegendBuilder,
    key: &str,
    section: &str,
    unit: &str,
    occurrences: usize,
) -> String {
    if occurrences <= 1 {
        return key.to_string();
    }
    let base = if section.is_empty() {
        key.to_string()
    } else {
        format!("{section}_{key}")
    };
    if !builder.contains(&base) && !section.is_empty() {
        return base;
    }
    if !unit.is_empty() {
        let with_unit = format!("{base}_{unit}");
        if !builder.contains(&with_unit) {
            return with_unit;
        }
    }
    (0..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !builder.contains(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
folder,nb12
nozzle inner width (mm),0.603
bath velocity (m/s),0.01
ink
transportModel,Newtonian
nu,0.001,m^2/s
rho,1000,kg/m^3
sup
transportModel,Herschel-Bulkley
rho,1000,kg/m^3
";

    #[test]
    fn keys_are_canonicalised() {
        let le = Legend::parse(SAMPLE).unwrap();
        assert_eq!(le.get_f64("nozzle_inner_width").unwrap(), 0.603);
        assert_eq!(le.unit("nozzle_inner_width"), Some("mm"));
        assert_eq!(le.unit("bath_velocity"), Some("m/s"));
        assert_eq!(le.value("folder"), Some("nb12"));
    }

    #[test]
    fn repeated_keys_are_qualified_by_section() {
        let le = Legend::parse(SAMPLE).unwrap();
        assert_eq!(le.value("ink_transportModel"), Some("Newtonian"));
        assert_eq!(le.value("sup_transportModel"), Some("Herschel-Bulkley"));
        assert_eq!(le.get_f64("ink_rho").unwrap(), 1000.0);
        assert_eq!(le.get_f64("sup_rho").unwrap(), 1000.0);
        // unique keys stay bare
        assert_eq!(le.value("nu"), Some("0.001"));
        assert!(le.get("sup").is_none());
    }

    #[test]
    fn blank_row_starts_titled_section() {
        let text = "a,1\n\ncontrolDict\nendTime,2.5,s\n\nmesh\nendTime,1\n";
        let le = Legend::parse(text).unwrap();
        assert_eq!(le.get_f64("controlDict_endTime").unwrap(), 2.5);
        assert_eq!(le.get_f64("mesh_endTime").unwrap(), 1.0);
    }

    #[test]
    fn builder_rejects_duplicates() {
        let mut b = Legend::builder();
        b.insert("a", "1", "").unwrap();
        let err = b.insert("a", "2", "").unwrap_err();
        assert!(matches!(err, FolderError::DuplicateKey(k) if k == "a"));
    }

    #[test]
    fn missing_and_non_numeric_keys() {
        let le = Legend::parse("a,abc\n").unwrap();
        assert!(le.get_f64("b").unwrap_err().is_missing_data());
        assert!(matches!(
            le.get_f64("a").unwrap_err(),
            FolderError::NotNumeric { .. }
        ));
    }
}
