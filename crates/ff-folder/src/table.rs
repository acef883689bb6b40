//! Flat comma-separated tables with a units row.
//!
//! Layout:
//! - header row of column names (optionally double-quoted)
//! - optional units row, recognised when none of its cells is numeric
//! - data rows

use std::fmt::Write as _;
use std::path::Path;

use crate::{FolderError, FolderResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    /// One unit per column; empty strings when the file carries no units row.
    pub units: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, units: Vec<String>) -> Self {
        Self {
            columns,
            units,
            rows: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> FolderResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| FolderError::io(path, e))?;
        Self::parse(&text).map_err(|message| FolderError::Table {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let Some(header) = lines.next() else {
            return Ok(Self::default());
        };
        let columns: Vec<String> = split_line(header)
            .into_iter()
            .map(|c| c.trim().to_string())
            .collect();
        let width = columns.len();

        let mut units = vec![String::new(); width];
        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let mut cells = split_line(line);
            if cells.len() < width {
                cells.resize(width, String::new());
            } else if cells.len() > width {
                return Err(format!(
                    "row {} has {} cells, header has {}",
                    i + 2,
                    cells.len(),
                    width
                ));
            }
            if i == 0 && !cells.iter().any(|c| c.trim().parse::<f64>().is_ok()) {
                units = cells.into_iter().map(|c| c.trim().to_string()).collect();
                continue;
            }
            rows.push(cells);
        }
        Ok(Self {
            columns,
            units,
            rows,
        })
    }

    /// Case-insensitive column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn unit(&self, column: usize) -> &str {
        self.units.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn push_row(&mut self, values: &[f64]) {
        self.rows
            .push(values.iter().map(|v| format!("{v}")).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", join_line(&self.columns));
        let _ = writeln!(out, "{}", join_line(&self.units));
        for row in &self.rows {
            let _ = writeln!(out, "{}", join_line(row));
        }
        out
    }

    pub fn write(&self, path: &Path) -> FolderResult<()> {
        std::fs::write(path, self.to_csv()).map_err(|e| FolderError::io(path, e))?;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "exported table");
        Ok(())
    }
}

/// Split one line on commas, honouring double quotes.
fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cur = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cur.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut cur)),
            _ => cur.push(c),
        }
    }
    cells.push(cur);
    cells
}

fn join_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| {
            if c.contains(',') || c.contains('"') {
                format!("\"{}\"", c.replace('"', "\"\""))
            } else {
                c.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_units_and_rows() {
        let text = "\"x\",\"alpha.ink\",time\nm,,s\n0.001,1,2.5\n0.002,0.5,2.5\n";
        let t = Table::parse(text).unwrap();
        assert_eq!(t.columns, vec!["x", "alpha.ink", "time"]);
        assert_eq!(t.units, vec!["m", "", "s"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.column_index("ALPHA.INK"), Some(1));
    }

    #[test]
    fn units_row_is_optional() {
        let t = Table::parse("a,b\n1,2\n").unwrap();
        assert_eq!(t.units, vec!["", ""]);
        assert_eq!(t.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn rejects_wide_rows() {
        assert!(Table::parse("a,b\n1,2,3\n").is_err());
    }

    #[test]
    fn csv_roundtrip_keeps_units_and_quotes() {
        let mut t = Table::new(
            vec!["x".into(), "area".into()],
            vec!["mm".into(), "mm^2".into()],
        );
        t.push_row(&[0.1, 2.0 / 3.0]);
        let back = Table::parse(&t.to_csv()).unwrap();
        assert_eq!(back, t);
        assert_eq!(split_line("\"a,b\",c"), vec!["a,b", "c"]);
    }
}
