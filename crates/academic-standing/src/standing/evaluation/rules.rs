use super::super::domain::{Cutoff, TermSummary};
use super::config::StandingThresholds;

/// The slice of a term summary the classifier reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermSnapshot {
    pub gpax: f64,
    pub credit_all: u32,
    pub cutoff: Cutoff,
}

impl From<&TermSummary> for TermSnapshot {
    fn from(summary: &TermSummary) -> Self {
        Self {
            gpax: summary.gpax,
            credit_all: summary.credit_all,
            cutoff: summary.cutoff(),
        }
    }
}

pub(crate) struct ProbationSignals {
    pub gpax_low: bool,
    pub gpax_critical: bool,
    pub previous_low: bool,
    /// The preceding term exists and is not the student's very first term.
    pub previous_countable: bool,
}

impl ProbationSignals {
    pub fn at_risk(&self) -> bool {
        self.gpax_critical || self.previous_low
    }
}

pub(crate) fn probation_signals(
    current: &TermSnapshot,
    previous: Option<&TermSnapshot>,
    thresholds: &StandingThresholds,
) -> ProbationSignals {
    let gpax_low = current.gpax <= thresholds.probation_gpax && !current.cutoff.is_first_term();
    let gpax_critical = current.gpax <= thresholds.critical_gpax;
    let previous_low = previous
        .map(|term| term.gpax <= thresholds.probation_gpax)
        .unwrap_or(false);
    let previous_countable = previous
        .map(|term| !term.cutoff.is_first_term())
        .unwrap_or(false);

    ProbationSignals {
        gpax_low,
        gpax_critical,
        previous_low,
        previous_countable,
    }
}
