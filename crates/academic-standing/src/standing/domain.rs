use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for enrolled students.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for a curriculum (course) plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoursePlanId(pub u32);

impl fmt::Display for CoursePlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub u32);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub String);

/// Academic term within a study year. Declaration order is the term ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Term {
    First,
    Second,
    Summer,
}

impl Term {
    pub const fn ordinal(self) -> u8 {
        match self {
            Term::First => 1,
            Term::Second => 2,
            Term::Summer => 3,
        }
    }

    pub const fn is_summer(self) -> bool {
        matches!(self, Term::Summer)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Term::First => "first",
            Term::Second => "second",
            Term::Summer => "summer",
        }
    }
}

impl TryFrom<u8> for Term {
    type Error = CutoffError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Term::First),
            2 => Ok(Term::Second),
            3 => Ok(Term::Summer),
            other => Err(CutoffError::InvalidTerm(other)),
        }
    }
}

impl From<Term> for u8 {
    fn from(value: Term) -> Self {
        value.ordinal()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive (study year, term) bound. Ordering compares the year first, then the
/// term ordinal, so `Cutoff { year: 2, term: Summer }` sorts after both regular terms
/// of year 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cutoff {
    pub year: u16,
    pub term: Term,
}

impl Cutoff {
    pub fn new(year: u16, term: u8) -> Result<Self, CutoffError> {
        if year == 0 {
            return Err(CutoffError::InvalidYear(year));
        }
        Ok(Self {
            year,
            term: Term::try_from(term)?,
        })
    }

    pub const fn of(year: u16, term: Term) -> Self {
        Self { year, term }
    }

    /// The student's very first regular term (year 1, first term).
    pub const fn is_first_term(&self) -> bool {
        self.year == 1 && matches!(self.term, Term::First)
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year {} {} term", self.year, self.term)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CutoffError {
    #[error("term {0} is outside 1 (first), 2 (second), 3 (summer)")]
    InvalidTerm(u8),
    #[error("study year {0} must be 1 or greater")]
    InvalidYear(u16),
}

/// One course enrollment with its (possibly pending) grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    /// Calendar year the registration happened in.
    pub semester_year: u16,
    pub semester_term: Term,
    /// Study progress position (year of study, term) of the registration.
    pub study_year: u16,
    pub study_term: Term,
    pub grade_point: Option<f64>,
    pub letter_grade: Option<String>,
    pub credits: u32,
}

impl RegistrationRecord {
    pub fn progress(&self) -> Cutoff {
        Cutoff::of(self.study_year, self.study_term)
    }

    pub fn is_failing(&self) -> bool {
        self.letter_grade
            .as_deref()
            .map(|grade| grade.trim().eq_ignore_ascii_case("F"))
            .unwrap_or(false)
    }

    /// Credits counted as earned: a failing grade keeps the record but earns nothing.
    pub fn earned_credits(&self) -> u32 {
        if self.is_failing() {
            0
        } else {
            self.credits
        }
    }
}

/// Subject category node; `parent` links into the category hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCategory {
    pub id: CategoryId,
    pub name: String,
    pub group: String,
    pub parent: Option<CategoryId>,
}

/// Curriculum plan totals and the categories its requirements are expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumPlan {
    pub id: CoursePlanId,
    pub name: String,
    pub total_credit: u32,
    pub internship_credit: u32,
    pub categories: Vec<SubjectCategory>,
}

/// Required credit for one category of a plan, optionally due by a given term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumRequirement {
    pub id: u32,
    pub plan_id: CoursePlanId,
    pub category_id: CategoryId,
    pub required_credit: u32,
    pub due: Option<Cutoff>,
}

impl CurriculumRequirement {
    pub fn is_due_by(&self, cutoff: Cutoff) -> bool {
        self.due.map(|due| due <= cutoff).unwrap_or(false)
    }
}

/// A required course of the student's plan and whether it has been passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentPlanEntry {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub planned_year: u16,
    pub planned_term: Term,
    pub category_id: CategoryId,
    pub credits: u32,
    pub is_pass: bool,
    pub grade_point: Option<f64>,
    pub pass_year: Option<u16>,
    pub pass_term: Option<Term>,
}

impl StudentPlanEntry {
    pub fn planned(&self) -> Cutoff {
        Cutoff::of(self.planned_year, self.planned_term)
    }

    /// Term in which the course was passed, when it has been.
    pub fn passed_at(&self) -> Option<Cutoff> {
        if !self.is_pass {
            return None;
        }
        match (self.pass_year, self.pass_term) {
            (Some(year), Some(term)) => Some(Cutoff::of(year, term)),
            _ => None,
        }
    }
}

/// Progression status tracked on the student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    Active,
    Expelled,
    Graduated,
}

impl StudentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Expelled => "expelled",
            StudentStatus::Graduated => "graduated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" | "studying" => Some(StudentStatus::Active),
            "expelled" | "terminated" => Some(StudentStatus::Expelled),
            "graduated" => Some(StudentStatus::Graduated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub plan_id: CoursePlanId,
    pub status: StudentStatus,
}

/// Per-requirement credit breakdown stored with a term summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermCredit {
    pub requirement_id: u32,
    pub category_id: CategoryId,
    pub credit_required: u32,
    /// Passed credit in the category, capped at `credit_required`.
    pub credit_passed: u32,
    pub average_grade: f64,
}

impl TermCredit {
    pub fn is_satisfied(&self) -> bool {
        self.credit_passed >= self.credit_required
    }
}

/// Durable per-term evaluation row, keyed by (student, study year, study term).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSummary {
    pub student_id: StudentId,
    pub study_year: u16,
    pub study_term: Term,
    pub semester_year: u16,
    pub semester_term: Term,
    pub credit_term: u32,
    pub credit_all: u32,
    pub gpa: f64,
    pub gpax: f64,
    pub grade_label: Option<String>,
    pub follows_plan: bool,
    pub coop_eligible: bool,
    pub status: StudentStatus,
    pub credits: Vec<TermCredit>,
}

impl TermSummary {
    pub fn cutoff(&self) -> Cutoff {
        Cutoff::of(self.study_year, self.study_term)
    }
}
