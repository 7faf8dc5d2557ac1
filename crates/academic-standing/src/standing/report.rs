//! Registrar-facing roll-up of every student's latest standing.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    CategoryId, CurriculumRequirement, Cutoff, Student, StudentId, StudentStatus, TermSummary,
};

/// A dated requirement whose due term has passed without the credit being earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueRequirement {
    pub category_id: CategoryId,
    pub due: Cutoff,
    pub credit_required: u32,
    pub credit_passed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingReportEntry {
    pub student_id: StudentId,
    pub name: String,
    pub status: StudentStatus,
    pub latest_term: Option<Cutoff>,
    pub gpax: Option<f64>,
    pub grade_label: Option<String>,
    pub credit_all: u32,
    pub total_credit: u32,
    pub follows_plan: Option<bool>,
    pub coop_eligible: bool,
    pub overdue: Vec<OverdueRequirement>,
}

impl StandingReportEntry {
    pub fn new(
        student: &Student,
        total_credit: u32,
        latest: Option<&TermSummary>,
        requirements: &[CurriculumRequirement],
    ) -> Self {
        let overdue = latest
            .map(|summary| overdue_requirements(summary, requirements))
            .unwrap_or_default();

        Self {
            student_id: student.id.clone(),
            name: student.name.clone(),
            status: student.status,
            latest_term: latest.map(TermSummary::cutoff),
            gpax: latest.map(|summary| summary.gpax),
            grade_label: latest.and_then(|summary| summary.grade_label.clone()),
            credit_all: latest.map(|summary| summary.credit_all).unwrap_or(0),
            total_credit,
            follows_plan: latest.map(|summary| summary.follows_plan),
            coop_eligible: latest.map(|summary| summary.coop_eligible).unwrap_or(false),
            overdue,
        }
    }

    pub fn needs_attention(&self) -> bool {
        !self.overdue.is_empty() || self.follows_plan == Some(false)
    }
}

/// Requirements due at or before the summary's term whose stored credit row is short.
pub fn overdue_requirements(
    summary: &TermSummary,
    requirements: &[CurriculumRequirement],
) -> Vec<OverdueRequirement> {
    let cutoff = summary.cutoff();
    requirements
        .iter()
        .filter(|requirement| requirement.is_due_by(cutoff))
        .filter_map(|requirement| {
            let credit_passed = summary
                .credits
                .iter()
                .find(|credit| credit.requirement_id == requirement.id)
                .map(|credit| credit.credit_passed)
                .unwrap_or(0);
            let due = requirement.due?;
            (credit_passed < requirement.required_credit).then_some(OverdueRequirement {
                category_id: requirement.category_id,
                due,
                credit_required: requirement.required_credit,
                credit_passed,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingReport {
    /// Date stamped on the report; entries always reflect each student's latest summary.
    pub as_of: NaiveDate,
    pub entries: Vec<StandingReportEntry>,
}

impl StandingReport {
    pub fn new(as_of: NaiveDate, mut entries: Vec<StandingReportEntry>) -> Self {
        entries.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Self { as_of, entries }
    }

    pub fn status_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.status.label()).or_insert(0) += 1;
        }
        counts
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "# Academic Standing Report");
        let _ = writeln!(
            output,
            "Generated {} for {} students",
            self.as_of,
            self.entries.len()
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "## Status Mix");

        if self.entries.is_empty() {
            let _ = writeln!(output, "No students on record.");
        } else {
            for (status, count) in self.status_counts() {
                let _ = writeln!(output, "- {}: {}", status, count);
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Students");

        for entry in &self.entries {
            match (entry.latest_term, entry.gpax) {
                (Some(term), Some(gpax)) => {
                    let _ = writeln!(
                        output,
                        "- {} ({}) {} at {}: gpax {:.2} [{}], {}/{} credits, co-op {}",
                        entry.name,
                        entry.student_id,
                        entry.status.label(),
                        term,
                        gpax,
                        entry.grade_label.as_deref().unwrap_or("unlabelled"),
                        entry.credit_all,
                        entry.total_credit,
                        if entry.coop_eligible { "eligible" } else { "not eligible" }
                    );
                }
                _ => {
                    let _ = writeln!(
                        output,
                        "- {} ({}) {}: no term summaries yet",
                        entry.name,
                        entry.student_id,
                        entry.status.label()
                    );
                }
            }
        }

        let attention: Vec<&StandingReportEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.needs_attention())
            .collect();

        let _ = writeln!(output);
        let _ = writeln!(output, "## Needs Attention");

        if attention.is_empty() {
            let _ = writeln!(output, "Every student is on plan.");
        } else {
            for entry in attention {
                if entry.follows_plan == Some(false) {
                    let _ = writeln!(
                        output,
                        "- {} ({}) has required courses outstanding",
                        entry.name, entry.student_id
                    );
                }
                for overdue in &entry.overdue {
                    let _ = writeln!(
                        output,
                        "- {} ({}) category {} due {}: {}/{} credits",
                        entry.name,
                        entry.student_id,
                        overdue.category_id,
                        overdue.due,
                        overdue.credit_passed,
                        overdue.credit_required
                    );
                }
            }
        }

        output
    }
}
