//! Simulated analysis progress.
//!
//! The backend reports no progress; the client walks a fixed list of steps on
//! a timer while the request is in flight and holds on the last step until
//! the response arrives.

use std::time::Duration;

pub const ANALYSIS_STEPS: [&str; 5] = [
    "Parsing VCF",
    "Extracting pharmacogenes",
    "Applying CPIC rules",
    "Generating explanation",
    "Compiling report",
];

pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSchedule {
    pub interval: Duration,
}

impl Default for ProgressSchedule {
    fn default() -> Self {
        Self {
            interval: DEFAULT_STEP_INTERVAL,
        }
    }
}

impl ProgressSchedule {
    /// Index of the active step after `elapsed`.
    pub fn step_at(&self, elapsed: Duration) -> usize {
        if self.interval.is_zero() {
            return ANALYSIS_STEPS.len() - 1;
        }
        let n = elapsed.as_nanos() / self.interval.as_nanos();
        usize::try_from(n).unwrap_or(usize::MAX).min(ANALYSIS_STEPS.len() - 1)
    }

    pub fn label_at(&self, elapsed: Duration) -> &'static str {
        ANALYSIS_STEPS[self.step_at(elapsed)]
    }

    /// Fraction of steps started, in (0, 1].
    pub fn fraction_at(&self, elapsed: Duration) -> f64 {
        (self.step_at(elapsed) + 1) as f64 / ANALYSIS_STEPS.len() as f64
    }
}
