//! Nozzle and bath geometry of one run, in millimetres and mm/s.

use ff_core::{length_to_mm, velocity_to_mm_per_s};
use serde::{Deserialize, Serialize};

use crate::legend::Legend;
use crate::FolderResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FolderGeometry {
    pub nozzle_inner_width: f64,
    pub nozzle_thickness: f64,
    pub nozzle_length: Option<f64>,
    /// Taper half-angle of the nozzle in degrees.
    pub nozzle_angle_deg: f64,
    pub nozzle_center_x: f64,
    pub nozzle_center_y: f64,
    pub nozzle_bottom_z: f64,
    pub bath_width: Option<f64>,
    pub bath_depth: Option<f64>,
    pub bath_velocity: f64,
    pub ink_velocity: f64,
}

impl FolderGeometry {
    pub fn from_legend(le: &Legend) -> FolderResult<Self> {
        let length = |key: &str| -> FolderResult<f64> {
            let v = le.get_f64(key)?;
            Ok(length_to_mm(v, le.unit(key).unwrap_or(""), key)?)
        };
        let optional_length = |key: &str| -> FolderResult<Option<f64>> {
            if le.get(key).is_none() {
                return Ok(None);
            }
            length(key).map(Some)
        };
        // The scraper records velocities in m/s, sometimes without a unit column.
        let velocity = |key: &str| -> FolderResult<f64> {
            let v = le.get_f64(key)?;
            let unit = match le.unit(key).unwrap_or("") {
                "" => "m/s",
                u => u,
            };
            Ok(velocity_to_mm_per_s(v, unit, key)?)
        };

        Ok(Self {
            nozzle_inner_width: length("nozzle_inner_width")?,
            nozzle_thickness: length("nozzle_thickness")?,
            nozzle_length: optional_length("nozzle_length")?,
            nozzle_angle_deg: if le.get("nozzle_angle").is_some() {
                le.get_f64("nozzle_angle")?
            } else {
                0.0
            },
            nozzle_center_x: length("nozzle_center_x_coord")?,
            nozzle_center_y: length("nozzle_center_y_coord")?,
            nozzle_bottom_z: length("nozzle_bottom_coord")?,
            bath_width: optional_length("bath_width")?,
            bath_depth: optional_length("bath_depth")?,
            bath_velocity: velocity("bath_velocity")?,
            ink_velocity: velocity("ink_velocity")?,
        })
    }

    pub fn read(folder: &std::path::Path) -> FolderResult<Self> {
        Self::from_legend(&Legend::read(folder)?)
    }

    /// Length used to non-dimensionalise slice measurements.
    pub fn characteristic_length(&self) -> f64 {
        self.nozzle_inner_width
    }

    /// Cross-sectional area of the nozzle bore.
    pub fn conduit_area(&self) -> f64 {
        std::f64::consts::PI * (self.nozzle_inner_width / 2.0).powi(2)
    }

    pub fn outer_width(&self) -> f64 {
        self.nozzle_inner_width + 2.0 * self.nozzle_thickness
    }

    pub fn nozzle_right_edge(&self) -> f64 {
        self.nozzle_center_x + self.nozzle_inner_width / 2.0 + self.nozzle_thickness
    }

    /// Axial position one inner width behind the nozzle; slices at or in
    /// front of it are still forming.
    pub fn axial_threshold(&self) -> f64 {
        self.nozzle_right_edge() + self.nozzle_inner_width
    }

    pub fn intended_z_center(&self) -> f64 {
        self.nozzle_bottom_z - self.nozzle_inner_width / 2.0
    }

    pub fn intended_z_bottom(&self) -> f64 {
        self.nozzle_bottom_z - self.nozzle_inner_width
    }

    pub fn tan_angle(&self) -> f64 {
        self.nozzle_angle_deg.to_radians().tan()
    }

    /// Bore radius at a height `z_rel` measured from the nozzle tip.
    pub fn local_radius(&self, z_rel: f64) -> f64 {
        self.nozzle_inner_width / 2.0 + z_rel.abs() * self.tan_angle()
    }
}
