//! Cooperative time budget for long per-folder computations.
//!
//! Geometry extraction cost grows with point-cloud size, so loops over slices
//! and planes poll a [`Deadline`] between iterations and bail out with
//! [`FfError::Timeout`] once the budget is spent.

use std::time::{Duration, Instant};

use crate::FfError;

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Self {
        Self {
            start: Instant::now(),
            budget: None,
        }
    }

    /// Start a budget of `seconds` from now. Non-positive or non-finite
    /// budgets disable the check.
    pub fn after_secs(seconds: Option<f64>) -> Self {
        let budget = seconds
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64);
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn expired(&self) -> bool {
        self.budget
            .is_some_and(|budget| self.start.elapsed() >= budget)
    }

    /// Error out if the budget is spent.
    pub fn check(&self, stage: &'static str) -> Result<(), FfError> {
        match self.budget {
            Some(budget) if self.start.elapsed() >= budget => Err(FfError::Timeout {
                stage,
                budget_s: budget.as_secs_f64(),
            }),
            _ => Ok(()),
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
