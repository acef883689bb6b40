//! Decay law constants and model parameters.

use ff_core::FfError;
use serde::{Deserialize, Serialize};

/// `S = exp(-a * tau^b * dt^c)` per step, with `tau` in Pa and `dt` in s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivalLaw {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for SurvivalLaw {
    fn default() -> Self {
        Self {
            a: 1e-3,
            b: 0.5,
            c: 0.5,
        }
    }
}

impl SurvivalLaw {
    /// Survival over one step, clamped to at most 1.
    pub fn step_factor(&self, stress: f64, dt: f64) -> f64 {
        (-self.a * stress.powf(self.b) * dt.powf(self.c)).exp().min(1.0)
    }

    /// Label like `S = exp(-0.001 tau^0.5 t^0.5)`.
    pub fn label(&self) -> String {
        format!("S = exp(-{} tau^{} t^{})", self.a, self.b, self.c)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    /// Simulation time of the nozzle point export, s.
    pub time: f64,
    pub law: SurvivalLaw,
    /// Width of a normalised-radius bin.
    pub bin_width: f64,
    /// Points with |y - yc| below this (mm) form the central plane.
    pub plane_half_thickness: f64,
    /// Fraction of the nozzle length, measured from the tip, that is kept.
    pub top_cutoff: f64,
    /// A step slower than this fraction of the previous one is skipped.
    pub discontinuity_ratio: f64,
    /// Bins sampled in fewer than this fraction of planes are dropped.
    pub coverage_fraction: f64,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            time: 2.5,
            law: SurvivalLaw::default(),
            bin_width: 0.05,
            plane_half_thickness: 0.1,
            top_cutoff: 0.9,
            discontinuity_ratio: 0.1,
            coverage_fraction: 0.9,
        }
    }
}

impl SurvivalConfig {
    pub fn validate(&self) -> Result<(), FfError> {
        let invalid = |what: &str| {
            Err(FfError::InvalidArg {
                what: what.to_string(),
            })
        };
        if !(self.bin_width > 0.0 && self.bin_width <= 1.0) {
            return invalid("survival bin width must be in (0, 1]");
        }
        if !(self.plane_half_thickness > 0.0) {
            return invalid("plane half thickness must be positive");
        }
        if !(0.0..=1.0).contains(&self.top_cutoff)
            || !(0.0..=1.0).contains(&self.discontinuity_ratio)
            || !(0.0..=1.0).contains(&self.coverage_fraction)
        {
            return invalid("survival fractions must lie in [0, 1]");
        }
        if ![self.law.a, self.law.b, self.law.c].iter().all(|v| v.is_finite()) {
            return invalid("survival law constants must be finite");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stress_survives() {
        let law = SurvivalLaw::default();
        assert_eq!(law.step_factor(0.0, 0.3), 1.0);
        assert!(law.step_factor(100.0, 0.3) < 1.0);
    }

    #[test]
    fn factor_never_exceeds_one() {
        let law = SurvivalLaw { a: -1.0, b: 1.0, c: 1.0 };
        assert_eq!(law.step_factor(5.0, 1.0), 1.0);
    }

    #[test]
    fn validation() {
        assert!(SurvivalConfig::default().validate().is_ok());
        let bad = SurvivalConfig {
            bin_width: 0.0,
            ..SurvivalConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = SurvivalConfig {
            coverage_fraction: 1.5,
            ..SurvivalConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
