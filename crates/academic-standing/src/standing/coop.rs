use super::domain::{Cutoff, TermSummary};

/// Co-op gate: cumulative credit must reach the plan's internship threshold, and only then
/// is the student's plan conformance at the summary's cutoff consulted.
///
/// Without a summary there is no cutoff to judge conformance at, so the student is not
/// eligible.
pub fn is_eligible_for_coop<F, E>(
    internship_credit: u32,
    latest: Option<&TermSummary>,
    follows_plan: F,
) -> Result<bool, E>
where
    F: FnOnce(Cutoff) -> Result<bool, E>,
{
    let Some(latest) = latest else {
        return Ok(false);
    };
    if latest.credit_all < internship_credit {
        return Ok(false);
    }
    follows_plan(latest.cutoff())
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::standing::domain::{StudentId, StudentStatus, Term};

    fn summary(credit_all: u32) -> TermSummary {
        TermSummary {
            student_id: StudentId("6520500001".to_string()),
            study_year: 3,
            study_term: Term::Second,
            semester_year: 2567,
            semester_term: Term::Second,
            credit_term: 18,
            credit_all,
            gpa: 3.1,
            gpax: 3.02,
            grade_label: Some("Normal".to_string()),
            follows_plan: true,
            coop_eligible: false,
            status: StudentStatus::Active,
            credits: Vec::new(),
        }
    }

    #[test]
    fn below_threshold_skips_conformance() {
        let latest = summary(89);
        let result: Result<bool, Infallible> =
            is_eligible_for_coop(90, Some(&latest), |_| panic!("conformance must not run"));
        assert_eq!(result, Ok(false));
    }

    #[test]
    fn at_threshold_defers_to_conformance_at_latest_cutoff() {
        let latest = summary(90);
        let mut seen = None;
        let result: Result<bool, Infallible> = is_eligible_for_coop(90, Some(&latest), |cutoff| {
            seen = Some(cutoff);
            Ok(true)
        });
        assert_eq!(result, Ok(true));
        assert_eq!(seen, Some(Cutoff::of(3, Term::Second)));

        let result: Result<bool, Infallible> =
            is_eligible_for_coop(90, Some(&latest), |_| Ok(false));
        assert_eq!(result, Ok(false));
    }

    #[test]
    fn missing_summary_is_not_eligible() {
        let result: Result<bool, Infallible> =
            is_eligible_for_coop(0, None, |_| panic!("no cutoff to judge"));
        assert_eq!(result, Ok(false));
    }

    #[test]
    fn conformance_errors_propagate() {
        let latest = summary(120);
        let result = is_eligible_for_coop(90, Some(&latest), |_| Err("plan store offline"));
        assert_eq!(result, Err("plan store offline"));
    }
}
