mod config;
mod policy;
mod rules;

pub use config::StandingThresholds;
pub use policy::{DecisionReason, StatusDecision};
pub use rules::TermSnapshot;

use super::domain::Term;
use policy::decide_status;
use serde::{Deserialize, Serialize};

/// Curriculum totals the graduation rule compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraduationFacts {
    pub total_credit: u32,
    /// Every per-category credit requirement of the plan is met.
    pub categories_met: bool,
}

/// Everything the classifier needs for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationInput {
    pub evaluated_term: Term,
    pub current: Option<TermSnapshot>,
    /// Most recent regular term before `current`.
    pub previous: Option<TermSnapshot>,
    pub graduation: GraduationFacts,
}

/// Stateless classifier applying the standing thresholds to term history.
#[derive(Debug, Clone, Default)]
pub struct StatusClassifier {
    thresholds: StandingThresholds,
}

impl StatusClassifier {
    pub fn new(thresholds: StandingThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &StandingThresholds {
        &self.thresholds
    }

    /// Classify a student. `follows_plan` is only invoked when the graduation rule
    /// needs it.
    pub fn classify<F, E>(
        &self,
        input: &ClassificationInput,
        follows_plan: F,
    ) -> Result<StatusDecision, E>
    where
        F: FnOnce() -> Result<bool, E>,
    {
        decide_status(input, &self.thresholds, follows_plan)
    }
}
