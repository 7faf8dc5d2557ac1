use serde::{Deserialize, Serialize};

use super::super::domain::StudentStatus;
use super::config::StandingThresholds;
use super::rules::probation_signals;
use super::ClassificationInput;

/// Status verdict together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDecision {
    pub status: StudentStatus,
    pub reason: DecisionReason,
}

impl StatusDecision {
    fn active(reason: DecisionReason) -> Self {
        Self {
            status: StudentStatus::Active,
            reason,
        }
    }
}

/// Enumerates the classifier rules so verdicts can be explained to advisors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DecisionReason {
    SummerTerm,
    NoHistory,
    CriticalGpax { gpax: f64 },
    ConsecutiveLowGpax { gpax: f64, previous_gpax: f64 },
    Probation { gpax: f64 },
    RequirementsComplete { credit_all: u32 },
    InsufficientCredit { earned: u32, required: u32 },
    CategoryShortfall,
    OffPlan,
}

impl DecisionReason {
    pub fn summary(&self) -> String {
        match self {
            DecisionReason::SummerTerm => "summer terms do not change standing".to_string(),
            DecisionReason::NoHistory => "no term summaries to judge yet".to_string(),
            DecisionReason::CriticalGpax { gpax } => {
                format!("dismissed for critical gpax {gpax:.2}")
            }
            DecisionReason::ConsecutiveLowGpax {
                gpax,
                previous_gpax,
            } => format!(
                "dismissed for consecutive low gpax ({previous_gpax:.2} then {gpax:.2})"
            ),
            DecisionReason::Probation { gpax } => {
                format!("on academic probation with gpax {gpax:.2}")
            }
            DecisionReason::RequirementsComplete { credit_all } => {
                format!("graduated with {credit_all} credits")
            }
            DecisionReason::InsufficientCredit { earned, required } => {
                format!("{earned} of {required} credits earned")
            }
            DecisionReason::CategoryShortfall => {
                "category credit requirements outstanding".to_string()
            }
            DecisionReason::OffPlan => "required courses outstanding".to_string(),
        }
    }
}

pub(crate) fn decide_status<F, E>(
    input: &ClassificationInput,
    thresholds: &StandingThresholds,
    follows_plan: F,
) -> Result<StatusDecision, E>
where
    F: FnOnce() -> Result<bool, E>,
{
    if input.evaluated_term.is_summer() {
        return Ok(StatusDecision::active(DecisionReason::SummerTerm));
    }

    let Some(current) = input.current.as_ref() else {
        return Ok(StatusDecision::active(DecisionReason::NoHistory));
    };
    let previous = input.previous.as_ref();

    let signals = probation_signals(current, previous, thresholds);
    if signals.gpax_low {
        if signals.at_risk() && signals.previous_countable {
            let reason = match previous {
                Some(previous) if !signals.gpax_critical => DecisionReason::ConsecutiveLowGpax {
                    gpax: current.gpax,
                    previous_gpax: previous.gpax,
                },
                _ => DecisionReason::CriticalGpax { gpax: current.gpax },
            };
            return Ok(StatusDecision {
                status: StudentStatus::Expelled,
                reason,
            });
        }
        return Ok(StatusDecision::active(DecisionReason::Probation {
            gpax: current.gpax,
        }));
    }

    let graduation = &input.graduation;
    if current.credit_all < graduation.total_credit {
        return Ok(StatusDecision::active(DecisionReason::InsufficientCredit {
            earned: current.credit_all,
            required: graduation.total_credit,
        }));
    }
    if !graduation.categories_met {
        return Ok(StatusDecision::active(DecisionReason::CategoryShortfall));
    }
    if !follows_plan()? {
        return Ok(StatusDecision::active(DecisionReason::OffPlan));
    }

    Ok(StatusDecision {
        status: StudentStatus::Graduated,
        reason: DecisionReason::RequirementsComplete {
            credit_all: current.credit_all,
        },
    })
}
