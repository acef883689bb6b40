//! Look up slice metrics at a requested time and distance behind the nozzle.

use ff_core::{closest, FfError};
use serde::Serialize;

use crate::metric::SliceMetric;
use crate::series::SliceSummarySeries;
use crate::SliceResult;

/// Largest accepted gap between the requested and recorded `xbehind`, in mm.
pub const MAX_POSITION_GAP: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    pub metric: SliceMetric,
    pub value: f64,
    pub unit: String,
}

/// Metric values of the slice at `time` closest to `xbehind`.
///
/// Fails with `MissingData` when nothing was recorded at that time, or the
/// closest recorded position is more than [`MAX_POSITION_GAP`] away.
pub fn metric_values(
    series: &SliceSummarySeries,
    time: f64,
    xbehind: f64,
    metrics: &[SliceMetric],
) -> SliceResult<Vec<MetricValue>> {
    let at_time: Vec<_> = series.iter().filter(|r| r.time == time).collect();
    let positions: Vec<f64> = at_time.iter().map(|r| r.xbehind).collect();
    let real = closest(&positions, xbehind)
        .ok_or_else(|| FfError::missing(format!("slices at t = {time}")))?;
    if (real - xbehind).abs() > MAX_POSITION_GAP {
        return Err(FfError::missing(format!("slice within {MAX_POSITION_GAP} of xbehind = {xbehind} at t = {time}")).into());
    }
    let matching: Vec<_> = at_time.into_iter().filter(|r| r.xbehind == real).collect();
    let [record] = matching.as_slice() else {
        return Err(FfError::Invariant {
            what: format!("{} slices at t = {time}, xbehind = {real}", matching.len()),
        }
        .into());
    };
    Ok(metrics
        .iter()
        .map(|m| MetricValue {
            metric: *m,
            value: record.get(*m),
            unit: series.units().unit(*m),
        })
        .collect())
}
