//! Survival along one radial streamline.

use serde::Serialize;

use crate::law::SurvivalLaw;

/// One accepted step along a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurvivalStep {
    /// Axial position, mm.
    pub x: f64,
    /// Height relative to the nozzle tip, mm.
    pub z: f64,
    /// Transit time since the first sample, s.
    pub elapsed: f64,
    pub dt: f64,
    /// Shear stress magnitude, Pa.
    pub stress: f64,
    /// Velocity magnitude, mm/s.
    pub velocity: f64,
    /// Cumulative survival after this step.
    pub survival: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// First sample: sets the starting position only.
    Seeded,
    Accepted,
    /// Velocity fell below the discontinuity ratio of the previous step.
    Discontinuity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalTrack {
    /// Normalised radius of the bin.
    pub rbar: f64,
    #[serde(skip)]
    law: SurvivalLaw,
    #[serde(skip)]
    discontinuity_ratio: f64,
    start: Option<(f64, f64)>,
    steps: Vec<SurvivalStep>,
    survival: f64,
    skipped: usize,
}

impl SurvivalTrack {
    pub fn new(rbar: f64, law: SurvivalLaw, discontinuity_ratio: f64) -> Self {
        Self {
            rbar,
            law,
            discontinuity_ratio,
            start: None,
            steps: Vec::new(),
            survival: 1.0,
            skipped: 0,
        }
    }

    /// Fold the next sample (in inlet-to-tip order) into the track.
    pub fn add_sample(&mut self, x: f64, z: f64, velocity: f64, stress: f64) -> StepOutcome {
        let Some(start) = self.start else {
            self.start = Some((x, z));
            return StepOutcome::Seeded;
        };
        let (px, pz) = self.steps.last().map_or(start, |s| (s.x, s.z));
        // the seed has no velocity, so the first step is always taken
        let previous = self.steps.last().map_or(0.0, |s| s.velocity);
        if velocity < self.discontinuity_ratio * previous {
            self.skipped += 1;
            tracing::debug!(rbar = self.rbar, x, z, velocity, previous, "velocity discontinuity");
            return StepOutcome::Discontinuity;
        }
        let dt = ((px - x).powi(2) + (pz - z).powi(2)).sqrt() / velocity;
        self.survival *= self.law.step_factor(stress, dt);
        let elapsed = self.steps.last().map_or(0.0, |s| s.elapsed) + dt;
        self.steps.push(SurvivalStep {
            x,
            z,
            elapsed,
            dt,
            stress,
            velocity,
            survival: self.survival,
        });
        StepOutcome::Accepted
    }

    /// Cumulative survival fraction.
    pub fn survival(&self) -> f64 {
        self.survival
    }

    pub fn steps(&self) -> &[SurvivalStep] {
        &self.steps
    }

    /// Positions recorded, including the starting sample.
    pub fn recorded(&self) -> usize {
        self.steps.len() + usize::from(self.start.is_some())
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Total transit time, s.
    pub fn elapsed(&self) -> f64 {
        self.steps.last().map_or(0.0, |s| s.elapsed)
    }

    /// Recorded (x, z) positions with z divided by `scale`.
    pub fn positions(&self, scale: f64) -> Vec<(f64, f64)> {
        self.start
            .into_iter()
            .chain(self.steps.iter().map(|s| (s.x, s.z)))
            .map(|(x, z)| (x, z / scale))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> SurvivalTrack {
        SurvivalTrack::new(0.5, SurvivalLaw::default(), 0.1)
    }

    #[test]
    fn zero_stress_keeps_full_survival() {
        let mut t = track();
        for (i, v) in [10.0, 11.0, 9.0, 10.0].into_iter().enumerate() {
            t.add_sample(-1.0, -4.0 + i as f64, v, 0.0);
        }
        assert_eq!(t.survival(), 1.0);
        assert_eq!(t.steps().len(), 3);
        assert_eq!(t.recorded(), 4);
    }

    #[test]
    fn steps_use_transit_time() {
        let mut t = track();
        assert_eq!(t.add_sample(0.0, -2.0, 5.0, 100.0), StepOutcome::Seeded);
        assert_eq!(t.add_sample(0.0, -1.0, 2.0, 100.0), StepOutcome::Accepted);
        let step = t.steps()[0];
        assert!((step.dt - 0.5).abs() < 1e-12);
        let expected = (-1e-3 * 10.0 * 0.5f64.sqrt()).exp();
        assert!((t.survival() - expected).abs() < 1e-12);
    }

    #[test]
    fn discontinuity_is_skipped() {
        let mut t = track();
        t.add_sample(0.0, -3.0, 10.0, 50.0);
        t.add_sample(0.0, -2.0, 10.0, 50.0);
        let before = t.survival();
        assert_eq!(t.add_sample(0.0, -1.5, 0.5, 5000.0), StepOutcome::Discontinuity);
        assert_eq!(t.survival(), before);
        assert_eq!(t.steps().len(), 1);
        assert_eq!(t.skipped(), 1);
        // later steps continue from the last accepted position
        assert_eq!(t.add_sample(0.0, -1.0, 10.0, 50.0), StepOutcome::Accepted);
        assert!((t.steps()[1].dt - 0.1).abs() < 1e-12);
    }

    #[test]
    fn positions_are_scaled() {
        let mut t = track();
        t.add_sample(1.0, -2.0, 1.0, 0.0);
        t.add_sample(1.0, -1.0, 1.0, 0.0);
        assert_eq!(t.positions(2.0), vec![(1.0, -1.0), (1.0, -0.5)]);
    }
}
