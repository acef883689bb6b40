//! Windowed spread search.

use ff_core::{round_to, unique_sorted, FfError};
use ff_slices::{SliceMetric, SliceSummarySeries};
use serde::{Deserialize, Serialize};

/// End reported for a window still steady at the last scanned value.
pub const OPEN_END: f64 = 1000.0;

/// Which variable groups the observations and which one is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteadyMode {
    /// Per position behind the nozzle, the steady range of times.
    TimeAtPosition,
    /// Per time, the steady range of positions behind the nozzle.
    PositionAtTime,
}

impl SteadyMode {
    pub fn group_metric(self) -> SliceMetric {
        match self {
            SteadyMode::TimeAtPosition => SliceMetric::XBehind,
            SteadyMode::PositionAtTime => SliceMetric::Time,
        }
    }

    pub fn scan_metric(self) -> SliceMetric {
        match self {
            SteadyMode::TimeAtPosition => SliceMetric::Time,
            SteadyMode::PositionAtTime => SliceMetric::XBehind,
        }
    }

    /// Column names of the persisted table: group, start, end.
    pub fn columns(self) -> [&'static str; 3] {
        match self {
            SteadyMode::TimeAtPosition => ["x", "t0", "tf"],
            SteadyMode::PositionAtTime => ["t", "x0", "xf"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteadyWindow {
    pub group: f64,
    pub start: f64,
    /// [`OPEN_END`] when the metric was still steady at the last value.
    pub end: f64,
}

impl SteadyWindow {
    pub fn is_open(&self) -> bool {
        self.end == OPEN_END
    }

    /// True when `scan` lies inside the window.
    pub fn contains(&self, scan: f64) -> bool {
        scan >= self.start && (self.is_open() || scan <= self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteadyConfig {
    pub metric: SliceMetric,
    /// Window width in seconds when scanning time.
    pub time_window: f64,
    /// Window width in mm when scanning position.
    pub position_window: f64,
    /// Largest metric spread still counted as steady.
    pub tolerance: f64,
}

impl Default for SteadyConfig {
    fn default() -> Self {
        Self {
            metric: SliceMetric::VertDispN,
            time_window: 1.0,
            position_window: 1.0,
            tolerance: 0.01,
        }
    }
}

impl SteadyConfig {
    pub fn width(&self, mode: SteadyMode) -> f64 {
        match mode {
            SteadyMode::TimeAtPosition => self.time_window,
            SteadyMode::PositionAtTime => self.position_window,
        }
    }

    pub fn validate(&self) -> Result<(), FfError> {
        if !(self.time_window > 0.0 && self.position_window > 0.0) {
            return Err(FfError::InvalidArg {
                what: "steady window widths must be positive".to_string(),
            });
        }
        if !(self.tolerance >= 0.0) {
            return Err(FfError::InvalidArg {
                what: "steady tolerance must be non-negative".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub group: f64,
    pub scan: f64,
    pub value: f64,
}

/// Spread of values whose scan coordinate lies within `half` of `center`.
fn spread(obs: &[&Observation], center: f64, half: f64) -> f64 {
    let lo = center - half;
    let hi = center + half;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for o in obs.iter().filter(|o| o.scan >= lo && o.scan <= hi) {
        min = min.min(o.value);
        max = max.max(o.value);
    }
    max - min
}

/// First steady window of each group, groups ascending.
///
/// The window centred on each scan value `v` spans `v ± width/2`. The search
/// moves along the scan values until the spread drops to `tolerance`, then
/// keeps moving while it stays there. Only the first window of a group is
/// reported. A window that begins at a group's last scan value is not
/// reported. Values are rounded to three decimals.
pub fn detect_observations(obs: &[Observation], width: f64, tolerance: f64) -> Vec<SteadyWindow> {
    if obs.len() < 2 {
        return Vec::new();
    }
    let half = width / 2.0;
    let mut out = Vec::new();
    for group in unique_sorted(obs.iter().map(|o| o.group)) {
        let members: Vec<&Observation> = obs.iter().filter(|o| o.group == group).collect();
        let scans = unique_sorted(members.iter().map(|o| o.scan));
        let n = scans.len();

        let mut i = 0;
        let mut range = spread(&members, scans[0], half);
        while range > tolerance && i + 1 < n {
            i += 1;
            range = spread(&members, scans[i], half);
        }
        if i + 1 >= n {
            continue;
        }
        let start = scans[i];
        while range <= tolerance && i + 1 < n {
            i += 1;
            range = spread(&members, scans[i], half);
        }
        let end = if i + 1 < n { scans[i] } else { OPEN_END };
        out.push(SteadyWindow {
            group: round_to(group, 3),
            start: round_to(start, 3),
            end: round_to(end, 3),
        });
    }
    out
}

/// Steady windows of `metric` in a slice summary series.
pub fn detect(
    series: &SliceSummarySeries,
    mode: SteadyMode,
    metric: SliceMetric,
    width: f64,
    tolerance: f64,
) -> Vec<SteadyWindow> {
    let obs: Vec<Observation> = series
        .iter()
        .map(|r| Observation {
            group: r.get(mode.group_metric()),
            scan: r.get(mode.scan_metric()),
            value: r.get(metric),
        })
        .collect();
    let windows = detect_observations(&obs, width, tolerance);
    tracing::debug!(?mode, %metric, windows = windows.len(), "steady windows");
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(g: f64, pairs: &[(f64, f64)]) -> Vec<Observation> {
        pairs
            .iter()
            .map(|&(scan, value)| Observation { group: g, scan, value })
            .collect()
    }

    fn jump_series() -> Vec<Observation> {
        let mut obs = group(0.0, &[(0.0, 0.10), (1.0, 0.10), (2.0, 0.11), (3.0, 0.50)]);
        obs.extend(group(1.0, &[(0.0, 0.3), (1.0, 0.9), (2.0, 0.1), (3.0, 0.7)]));
        obs
    }

    #[test]
    fn window_ends_before_the_jump() {
        let w = detect_observations(&jump_series(), 2.0, 0.02);
        assert_eq!(w, vec![SteadyWindow { group: 0.0, start: 0.0, end: 2.0 }]);
    }

    #[test]
    fn unit_width_windows_hold_single_points() {
        // each window holds one observation, so the spread never rises again
        let w = detect_observations(&jump_series(), 1.0, 0.02);
        assert_eq!(w.len(), 2);
        assert_eq!(w[0].start, 0.0);
        assert!(w.iter().all(SteadyWindow::is_open));
    }

    #[test]
    fn constant_group_covers_full_range() {
        let obs = group(2.0, &[(0.5, 1.0), (1.0, 1.0), (1.5, 1.0), (2.0, 1.0)]);
        let w = detect_observations(&obs, 1.0, 0.0);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].start, 0.5);
        assert!(w[0].is_open());
        assert!(w[0].contains(0.5) && w[0].contains(2.0));
    }

    #[test]
    fn too_few_observations() {
        assert!(detect_observations(&[], 1.0, 0.1).is_empty());
        let one = group(0.0, &[(0.0, 1.0)]);
        assert!(detect_observations(&one, 1.0, 0.1).is_empty());
    }

    #[test]
    fn only_first_window_is_reported() {
        let obs = group(
            0.0,
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 5.0), (3.0, 9.0), (4.0, 9.0), (5.0, 9.0), (6.0, 1.0)],
        );
        let w = detect_observations(&obs, 2.0, 0.01);
        assert_eq!(w, vec![SteadyWindow { group: 0.0, start: 0.0, end: 1.0 }]);
    }

    #[test]
    fn steady_only_at_last_value_is_not_reported() {
        let obs = group(0.0, &[(0.0, 0.0), (1.0, 5.0), (2.0, 1.0), (3.0, 1.0)]);
        // window at 3 covers {2, 3}: steady, but nothing follows it
        assert!(detect_observations(&obs, 2.0, 0.01).is_empty());
    }

    #[test]
    fn outputs_are_rounded() {
        let obs = group(0.123456, &[(0.10004, 1.0), (0.20004, 1.0), (0.30004, 1.0)]);
        let w = detect_observations(&obs, 0.05, 0.0);
        assert_eq!(w[0].group, 0.123);
        assert_eq!(w[0].start, 0.1);
    }

    #[test]
    fn config_defaults_and_validation() {
        let c = SteadyConfig::default();
        assert_eq!(c.metric, SliceMetric::VertDispN);
        assert_eq!(c.width(SteadyMode::PositionAtTime), 1.0);
        assert!(c.validate().is_ok());
        let bad = SteadyConfig { tolerance: -1.0, ..c };
        assert!(bad.validate().is_err());
    }
}
