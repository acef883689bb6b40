use crate::FfError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FfError::NonFinite { what, value: v })
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(v: Real, places: i32) -> Real {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}

/// Value in `values` closest to `target`. Ties keep the earlier value.
pub fn closest(values: &[Real], target: Real) -> Option<Real> {
    values.iter().copied().fold(None, |best, v| match best {
        Some(b) if (b - target).abs() <= (v - target).abs() => Some(b),
        _ => Some(v),
    })
}

/// Sorted, deduplicated copy of `values` (exact float equality).
pub fn unique_sorted(values: impl IntoIterator<Item = Real>) -> Vec<Real> {
    let mut out: Vec<Real> = values.into_iter().collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

/// (min, max) over an iterator, `None` when empty.
pub fn min_max(values: impl IntoIterator<Item = Real>) -> Option<(Real, Real)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
