//! Columns of the slice summary table.

use std::fmt;
use std::str::FromStr;

use ff_folder::PointCloud;
use serde::{Deserialize, Serialize};

use crate::SliceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceMetric {
    X,
    /// Axial distance from the nozzle centre.
    XBehind,
    Time,
    CenterY,
    CenterZ,
    Area,
    MaxHeight,
    MaxWidth,
    CenterYN,
    CenterZN,
    AreaN,
    MaxHeightN,
    MaxWidthN,
    /// Bottom of the slice relative to the intended filament bottom.
    VertDisp,
    VertDispN,
    AspectRatio,
    /// Mean axial speed of the interface points.
    Speed,
    /// Speed over bath speed.
    SpeedDecay,
}

impl SliceMetric {
    /// Every column, in table order.
    pub const ALL: [SliceMetric; 18] = [
        SliceMetric::X,
        SliceMetric::XBehind,
        SliceMetric::Time,
        SliceMetric::CenterY,
        SliceMetric::CenterZ,
        SliceMetric::Area,
        SliceMetric::MaxHeight,
        SliceMetric::MaxWidth,
        SliceMetric::CenterYN,
        SliceMetric::CenterZN,
        SliceMetric::AreaN,
        SliceMetric::MaxHeightN,
        SliceMetric::MaxWidthN,
        SliceMetric::VertDisp,
        SliceMetric::VertDispN,
        SliceMetric::AspectRatio,
        SliceMetric::Speed,
        SliceMetric::SpeedDecay,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SliceMetric::X => "x",
            SliceMetric::XBehind => "xbehind",
            SliceMetric::Time => "time",
            SliceMetric::CenterY => "centery",
            SliceMetric::CenterZ => "centerz",
            SliceMetric::Area => "area",
            SliceMetric::MaxHeight => "maxheight",
            SliceMetric::MaxWidth => "maxwidth",
            SliceMetric::CenterYN => "centeryn",
            SliceMetric::CenterZN => "centerzn",
            SliceMetric::AreaN => "arean",
            SliceMetric::MaxHeightN => "maxheightn",
            SliceMetric::MaxWidthN => "maxwidthn",
            SliceMetric::VertDisp => "vertdisp",
            SliceMetric::VertDispN => "vertdispn",
            SliceMetric::AspectRatio => "aspectratio",
            SliceMetric::Speed => "speed",
            SliceMetric::SpeedDecay => "speeddecay",
        }
    }

    /// Unit under the default millimetre/second convention.
    pub fn unit(self) -> String {
        SliceUnits::default().unit(self)
    }

    /// Position of the column in [`SliceMetric::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }
}

impl fmt::Display for SliceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SliceMetric {
    type Err = SliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SliceError::UnknownMetric(s.to_string()))
    }
}

/// Units the slice columns derive from: the point cloud's length, time and
/// velocity units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceUnits {
    pub length: String,
    pub time: String,
    pub speed: String,
}

impl Default for SliceUnits {
    fn default() -> Self {
        Self {
            length: "mm".to_string(),
            time: "s".to_string(),
            speed: "mm/s".to_string(),
        }
    }
}

impl SliceUnits {
    pub fn from_cloud(cloud: &PointCloud) -> Self {
        let pick = |col: &str, fallback: String| {
            cloud
                .unit(col)
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .unwrap_or(fallback)
        };
        let d = Self::default();
        Self {
            length: pick("x", d.length),
            time: pick("time", d.time),
            speed: pick("vx", d.speed),
        }
    }

    pub fn unit(&self, metric: SliceMetric) -> String {
        use SliceMetric::*;
        match metric {
            X | XBehind | CenterY | CenterZ | MaxHeight | MaxWidth | VertDisp => self.length.clone(),
            Area => format!("{}^2", self.length),
            Time => self.time.clone(),
            Speed => self.speed.clone(),
            CenterYN | CenterZN | AreaN | MaxHeightN | MaxWidthN | VertDispN | AspectRatio
            | SpeedDecay => String::new(),
        }
    }

    /// Units row in table order.
    pub fn row(&self) -> Vec<String> {
        SliceMetric::ALL.iter().map(|m| self.unit(*m)).collect()
    }
}
