//! SI quantities at the ingestion boundary; everything downstream is mm, s, mm/s.

use uom::si::f64::{Length as UomLength, Velocity as UomVelocity};

use crate::FfError;

pub type Length = UomLength;
pub type Velocity = UomVelocity;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

/// Length expressed in millimetres.
#[inline]
pub fn to_mm(l: Length) -> f64 {
    use uom::si::length::millimeter;
    l.get::<millimeter>()
}

/// Velocity expressed in millimetres per second.
#[inline]
pub fn to_mm_per_s(v: Velocity) -> f64 {
    use uom::si::velocity::millimeter_per_second;
    v.get::<millimeter_per_second>()
}

/// Multiplier applied to metre-based columns at ingestion.
pub fn metre_to_mm_factor() -> f64 {
    to_mm(m(1.0))
}

/// Relabel a column unit after the ×1000 ingestion scaling.
///
/// `m` becomes `mm`, `m/s` becomes `mm/s`; anything else is tagged `*10^3`.
pub fn scaled_unit_label(unit: &str) -> String {
    match unit {
        "m" => "mm".to_string(),
        "m/s" => "mm/s".to_string(),
        other => format!("{other}*10^3"),
    }
}

/// Convert a velocity declared with `unit` into mm/s.
pub fn velocity_to_mm_per_s(value: f64, unit: &str, quantity: &str) -> Result<f64, FfError> {
    match unit.trim() {
        "mm/s" => Ok(value),
        "m/s" => Ok(to_mm_per_s(mps(value))),
        other => Err(FfError::UnitMismatch {
            quantity: quantity.to_string(),
            expected: "mm/s".to_string(),
            found: other.to_string(),
        }),
    }
}

/// Convert a length declared with `unit` into mm.
pub fn length_to_mm(value: f64, unit: &str, quantity: &str) -> Result<f64, FfError> {
    match unit.trim() {
        "mm" | "" => Ok(value),
        "m" => Ok(to_mm(m(value))),
        other => Err(FfError::UnitMismatch {
            quantity: quantity.to_string(),
            expected: "mm".to_string(),
            found: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_convert_to_mm() {
        assert!((to_mm(m(0.0006)) - 0.6).abs() < 1e-12);
        assert!((to_mm(mm(0.9)) - 0.9).abs() < 1e-12);
        assert!((length_to_mm(0.5, "m", "niw").unwrap() - 500.0).abs() < 1e-9);
        assert!(length_to_mm(0.5, "in", "niw").is_err());
    }

    #[test]
    fn metre_factor_is_one_thousand() {
        assert!((metre_to_mm_factor() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn unit_labels_follow_scaling() {
        assert_eq!(scaled_unit_label("m"), "mm");
        assert_eq!(scaled_unit_label("m/s"), "mm/s");
        assert_eq!(scaled_unit_label("1/s"), "1/s*10^3");
    }

    #[test]
    fn velocity_conversion_checks_units() {
        assert!((velocity_to_mm_per_s(0.01, "m/s", "bv").unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(velocity_to_mm_per_s(10.0, "mm/s", "bv").unwrap(), 10.0);
        let err = velocity_to_mm_per_s(1.0, "in/s", "bv").unwrap_err();
        assert!(matches!(err, FfError::UnitMismatch { .. }));
    }
}
