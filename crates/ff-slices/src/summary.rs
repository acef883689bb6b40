//! Per-slice geometric summaries.

use ff_core::{min_max, Deadline, FfError};
use ff_folder::{FolderGeometry, PointCloud, PointRecord};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::hull::{area_and_centroid, convex_hull};
use crate::metric::SliceMetric;
use crate::SliceResult;

/// Summary of one slice. Lengths in mm, speeds in mm/s; `*n` fields are
/// normalised by the nozzle inner width (area by the bore area).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceSummaryRecord {
    pub x: f64,
    pub xbehind: f64,
    pub time: f64,
    pub centery: f64,
    pub centerz: f64,
    pub area: f64,
    pub maxheight: f64,
    pub maxwidth: f64,
    pub centeryn: f64,
    pub centerzn: f64,
    pub arean: f64,
    pub maxheightn: f64,
    pub maxwidthn: f64,
    pub vertdisp: f64,
    pub vertdispn: f64,
    pub aspectratio: f64,
    pub speed: f64,
    pub speeddecay: f64,
}

impl SliceSummaryRecord {
    pub fn get(&self, metric: SliceMetric) -> f64 {
        use SliceMetric::*;
        match metric {
            X => self.x,
            XBehind => self.xbehind,
            Time => self.time,
            CenterY => self.centery,
            CenterZ => self.centerz,
            Area => self.area,
            MaxHeight => self.maxheight,
            MaxWidth => self.maxwidth,
            CenterYN => self.centeryn,
            CenterZN => self.centerzn,
            AreaN => self.arean,
            MaxHeightN => self.maxheightn,
            MaxWidthN => self.maxwidthn,
            VertDisp => self.vertdisp,
            VertDispN => self.vertdispn,
            AspectRatio => self.aspectratio,
            Speed => self.speed,
            SpeedDecay => self.speeddecay,
        }
    }

    /// Values in table column order.
    pub fn values(&self) -> [f64; 18] {
        SliceMetric::ALL.map(|m| self.get(m))
    }

    /// Inverse of [`SliceSummaryRecord::values`].
    pub fn from_values(v: [f64; 18]) -> Self {
        let [x, xbehind, time, centery, centerz, area, maxheight, maxwidth, centeryn, centerzn, arean, maxheightn, maxwidthn, vertdisp, vertdispn, aspectratio, speed, speeddecay] =
            v;
        Self {
            x,
            xbehind,
            time,
            centery,
            centerz,
            area,
            maxheight,
            maxwidth,
            centeryn,
            centerzn,
            arean,
            maxheightn,
            maxwidthn,
            vertdisp,
            vertdispn,
            aspectratio,
            speed,
            speeddecay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Smallest slice that gets a hull.
    pub min_points: usize,
    /// Skip slices at or in front of the axial threshold.
    pub exclude_behind: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_points: 10,
            exclude_behind: true,
        }
    }
}

/// A slice that could not be summarised.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceRejection {
    pub time: f64,
    pub x: f64,
    pub error: FfError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceExtraction {
    /// Ascending in x.
    pub records: Vec<SliceSummaryRecord>,
    pub rejected: Vec<SliceRejection>,
}

/// Summarise one slice of points sharing an axial position.
///
/// `time` is the snapshot time of the whole cloud and overrides any
/// per-point time column.
pub fn summarize_slice(
    points: &[&PointRecord],
    time: f64,
    geo: &FolderGeometry,
    min_points: usize,
) -> Result<SliceSummaryRecord, FfError> {
    if points.len() < min_points || points.is_empty() {
        return Err(FfError::InsufficientSamples {
            needed: min_points.max(1),
            found: points.len(),
        });
    }
    let first = points[0];
    let x = first.x();

    let (ymin, ymax) = min_max(points.iter().map(|p| p.y())).unwrap_or_default();
    let (zmin, zmax) = min_max(points.iter().map(|p| p.z())).unwrap_or_default();
    let maxwidth = ymax - ymin;
    let maxheight = zmax - zmin;
    if maxheight == 0.0 || maxwidth == 0.0 {
        return Err(FfError::DegenerateGeometry {
            what: "zero-extent cross-section",
        });
    }

    let cross: Vec<Point2<f64>> = points.iter().map(|p| Point2::new(p.y(), p.z())).collect();
    let hull = convex_hull(&cross);
    let (area, centroid) = area_and_centroid(&hull).ok_or(FfError::DegenerateGeometry {
        what: "zero-area hull",
    })?;

    let niw = geo.characteristic_length();
    let vertdisp = zmin - geo.intended_z_bottom();
    let speed = points.iter().map(|p| p.velocity.x).sum::<f64>() / points.len() as f64;

    Ok(SliceSummaryRecord {
        x,
        xbehind: x - geo.nozzle_center_x,
        time,
        centery: centroid.x,
        centerz: centroid.y,
        area,
        maxheight,
        maxwidth,
        centeryn: centroid.x / niw,
        centerzn: centroid.y / niw,
        arean: area / geo.conduit_area(),
        maxheightn: maxheight / niw,
        maxwidthn: maxwidth / niw,
        vertdisp,
        vertdispn: vertdisp / niw,
        aspectratio: maxheight / maxwidth,
        speed,
        speeddecay: speed / geo.bath_velocity,
    })
}

/// Summarise every slice of one point cloud.
///
/// Slices at or in front of `axial_threshold` are skipped. Slices that are
/// too small or degenerate are logged and returned as rejections; any other
/// failure, or running out of time, aborts the cloud.
pub fn summarize(
    cloud: &PointCloud,
    time: f64,
    axial_threshold: Option<f64>,
    geo: &FolderGeometry,
    config: &ExtractorConfig,
    deadline: &Deadline,
) -> SliceResult<SliceExtraction> {
    let mut out = SliceExtraction::default();
    for (x, points) in cloud.group_by_axial() {
        if axial_threshold.is_some_and(|limit| x <= limit) {
            continue;
        }
        deadline.check("slice summary")?;
        match summarize_slice(&points, time, geo, config.min_points) {
            Ok(record) => out.records.push(record),
            Err(error) if error.is_local() => {
                tracing::warn!(time, x, %error, "skipped slice");
                out.rejected.push(SliceRejection { time, x, error });
            }
            Err(error) => return Err(error.into()),
        }
    }
    Ok(out)
}
