//! Point clouds exported per simulation time.

use std::path::Path;

use ff_core::{metre_to_mm_factor, scaled_unit_label, FfError};
use nalgebra::Vector3;

use crate::table::Table;
use crate::{FolderError, FolderResult};

/// One sampled point. Lengths in mm, velocities in mm/s, stress in Pa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    /// Ink phase fraction.
    pub alpha: Option<f64>,
    /// Velocity magnitude.
    pub magu: f64,
    pub shear_stress: Option<f64>,
    pub time: Option<f64>,
}

impl PointRecord {
    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<PointRecord>,
    units: Vec<(String, String)>,
}

struct Columns {
    x: usize,
    y: usize,
    z: usize,
    vx: usize,
    vy: usize,
    vz: usize,
    magu: Option<usize>,
    alpha: Option<usize>,
    shear: Option<usize>,
    time: Option<usize>,
}

impl PointCloud {
    pub fn new(points: Vec<PointRecord>) -> Self {
        Self {
            points,
            units: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> FolderResult<Self> {
        if !path.exists() {
            return Err(FfError::missing(format!("point file {}", path.display())).into());
        }
        let table = Table::read(path)?;
        Self::from_table(&table).map_err(|message| FolderError::Table {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_table(table: &Table) -> Result<Self, String> {
        let req = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| format!("missing column {name}"))
        };
        let cols = Columns {
            x: req("x")?,
            y: req("y")?,
            z: req("z")?,
            vx: req("vx")?,
            vy: req("vy")?,
            vz: req("vz")?,
            magu: table.column_index("magu"),
            alpha: table.column_index("alpha").or_else(|| {
                table
                    .columns
                    .iter()
                    .position(|c| c.to_ascii_lowercase().starts_with("alpha"))
            }),
            shear: table.column_index("shearstressmag"),
            time: table.column_index("time"),
        };

        let mut units = Vec::new();
        let mut scale = [1.0; 7];
        let scaled = [cols.x, cols.y, cols.z, cols.vx, cols.vy, cols.vz];
        for (slot, (&col, name)) in scaled
            .iter()
            .zip(["x", "y", "z", "vx", "vy", "vz"])
            .enumerate()
        {
            let (factor, unit) = ingest_scale(table.unit(col), slot >= 3);
            scale[slot] = factor;
            units.push((name.to_string(), unit));
        }
        if let Some(col) = cols.magu {
            let (factor, unit) = ingest_scale(table.unit(col), true);
            scale[6] = factor;
            units.push(("magu".to_string(), unit));
        } else {
            let vel_unit = units[3].1.clone();
            units.push(("magu".to_string(), vel_unit));
        }
        for (name, col) in [("alpha", cols.alpha), ("shearstressmag", cols.shear), ("time", cols.time)] {
            if let Some(col) = col {
                units.push((name.to_string(), table.unit(col).to_string()));
            }
        }

        let mut points = Vec::with_capacity(table.rows.len());
        for (i, row) in table.rows.iter().enumerate() {
            // rows without a numeric time are solver/tool artefacts
            let time = match cols.time {
                Some(col) => match row[col].trim().parse::<f64>() {
                    Ok(t) => Some(t),
                    Err(_) => continue,
                },
                None => None,
            };
            let num = |col: usize, name: &str| -> Result<f64, String> {
                row[col]
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("non-numeric {name} on data row {}", i + 1))
            };
            let opt = |col: Option<usize>, name: &str| -> Result<Option<f64>, String> {
                col.map(|c| num(c, name)).transpose()
            };
            let position = Vector3::new(
                num(cols.x, "x")? * scale[0],
                num(cols.y, "y")? * scale[1],
                num(cols.z, "z")? * scale[2],
            );
            let velocity = Vector3::new(
                num(cols.vx, "vx")? * scale[3],
                num(cols.vy, "vy")? * scale[4],
                num(cols.vz, "vz")? * scale[5],
            );
            let magu = match cols.magu {
                Some(col) => num(col, "magu")? * scale[6],
                None => velocity.norm(),
            };
            points.push(PointRecord {
                position,
                velocity,
                alpha: opt(cols.alpha, "alpha")?,
                magu,
                shear_stress: opt(cols.shear, "shearstressmag")?,
                time,
            });
        }
        Ok(Self { points, units })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unit of a canonical column after ingestion, if known.
    pub fn unit(&self, column: &str) -> Option<&str> {
        self.units
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, u)| u.as_str())
    }

    /// Sorted distinct axial (x) positions.
    pub fn axial_positions(&self) -> Vec<f64> {
        ff_core::unique_sorted(self.points.iter().map(PointRecord::x))
    }

    /// Points grouped by exact axial coordinate, ascending.
    pub fn group_by_axial(&self) -> Vec<(f64, Vec<&PointRecord>)> {
        let mut sorted: Vec<&PointRecord> = self.points.iter().collect();
        sorted.sort_by(|a, b| a.x().total_cmp(&b.x()));
        let mut groups: Vec<(f64, Vec<&PointRecord>)> = Vec::new();
        for p in sorted {
            match groups.last_mut() {
                Some((x, members)) if *x == p.x() => members.push(p),
                _ => groups.push((p.x(), vec![p])),
            }
        }
        groups
    }

    /// The slice at the recorded x closest to `x`, if it lies within `max_gap`.
    pub fn slice_near(&self, x: f64, max_gap: f64) -> Option<(f64, Vec<&PointRecord>)> {
        let xs = self.axial_positions();
        let real = ff_core::closest(&xs, x)?;
        if (real - x).abs() > max_gap {
            return None;
        }
        Some((
            real,
            self.points.iter().filter(|p| p.x() == real).collect(),
        ))
    }
}

/// Factor and relabelled unit for a length (or velocity) column.
///
/// Columns already in millimetres are left alone; unlabelled columns are
/// assumed to be in metres.
fn ingest_scale(unit: &str, is_velocity: bool) -> (f64, String) {
    match unit {
        "mm" | "mm/s" => (1.0, unit.to_string()),
        "" if is_velocity => (metre_to_mm_factor(), "mm/s".to_string()),
        "" => (metre_to_mm_factor(), "mm".to_string()),
        other => (metre_to_mm_factor(), scaled_unit_label(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
x,y,z,vx,vy,vz,alpha,magu,shearstressmag,time
m,m,m,m/s,m/s,m/s,,m/s,Pa,s
0.001,0.0,0.0,0.01,0,0,1,0.01,2,2.5
0.001,0.0005,0.0,0.01,0,0,1,0.01,2,2.5
0.002,0.0,0.0,0.02,0,0,1,0.02,2,2.5
0.003,0.0,0.0,0.02,0,0,1,0.02,2,Time
";

    #[test]
    fn converts_metres_to_millimetres() {
        let cloud = PointCloud::from_table(&Table::parse(CSV).unwrap()).unwrap();
        assert_eq!(cloud.len(), 3, "non-numeric time row dropped");
        let p = &cloud.points[1];
        assert!((p.y() - 0.5).abs() < 1e-12);
        assert!((p.velocity.x - 10.0).abs() < 1e-12);
        assert!((p.magu - 10.0).abs() < 1e-12);
        assert_eq!(p.shear_stress, Some(2.0));
        assert_eq!(cloud.unit("x"), Some("mm"));
        assert_eq!(cloud.unit("magu"), Some("mm/s"));
        assert_eq!(cloud.unit("shearstressmag"), Some("Pa"));
    }

    #[test]
    fn groups_by_exact_axial_position() {
        let cloud = PointCloud::from_table(&Table::parse(CSV).unwrap()).unwrap();
        let groups = cloud.group_by_axial();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1.len(), 2);
        let xs = cloud.axial_positions();
        assert_eq!(xs.len(), 2);
        assert!((xs[0] - 1.0).abs() < 1e-12 && (xs[1] - 2.0).abs() < 1e-12);
        let (x, pts) = cloud.slice_near(1.1, 0.2).unwrap();
        assert_eq!(x, xs[0]);
        assert_eq!(pts.len(), 2);
        assert!(cloud.slice_near(5.0, 0.2).is_none());
    }

    #[test]
    fn magnitude_falls_back_to_velocity_norm() {
        let text = "x,y,z,vx,vy,vz\nmm,mm,mm,mm/s,mm/s,mm/s\n0,0,0,3,4,0\n";
        let cloud = PointCloud::from_table(&Table::parse(text).unwrap()).unwrap();
        assert_eq!(cloud.points[0].magu, 5.0);
        assert_eq!(cloud.points[0].time, None);
    }

    #[test]
    fn missing_file_is_missing_data() {
        let err = PointCloud::read(Path::new("/nonexistent/pts.csv")).unwrap_err();
        assert!(err.is_missing_data());
    }
}
