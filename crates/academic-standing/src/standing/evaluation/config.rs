use serde::{Deserialize, Serialize};

/// GPAX thresholds for the academic probation rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandingThresholds {
    /// At or below this GPAX a student is on watch.
    pub probation_gpax: f64,
    /// At or below this GPAX a single term is enough for dismissal.
    pub critical_gpax: f64,
}

impl Default for StandingThresholds {
    fn default() -> Self {
        Self {
            probation_gpax: 1.75,
            critical_gpax: 1.5,
        }
    }
}
