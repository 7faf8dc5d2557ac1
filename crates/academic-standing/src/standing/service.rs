use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::conformance;
use super::coop;
use super::credits::{aggregate_credits, requirements_met, CategoryTree, CategoryTreeError};
use super::domain::{
    CoursePlanId, CurriculumPlan, Cutoff, CutoffError, RegistrationRecord, Student, StudentId,
    StudentPlanEntry, TermSummary,
};
use super::evaluation::{
    ClassificationInput, GraduationFacts, StandingThresholds, StatusClassifier, StatusDecision,
    TermSnapshot,
};
use super::gpa::gpa_for;
use super::labels::GradeLabelSet;
use super::report::{StandingReport, StandingReportEntry};
use super::repository::{RepositoryError, StandingRepositories};

/// Service composing the standing collaborators with the status classifier.
#[derive(Clone)]
pub struct StandingService {
    repos: StandingRepositories,
    classifier: StatusClassifier,
    labels: GradeLabelSet,
}

impl StandingService {
    pub fn new(repos: StandingRepositories, thresholds: StandingThresholds) -> Self {
        Self::with_labels(repos, thresholds, GradeLabelSet::standard())
    }

    pub fn with_labels(
        repos: StandingRepositories,
        thresholds: StandingThresholds,
        labels: GradeLabelSet,
    ) -> Self {
        Self {
            repos,
            classifier: StatusClassifier::new(thresholds),
            labels,
        }
    }

    pub fn thresholds(&self) -> &StandingThresholds {
        self.classifier.thresholds()
    }

    /// Build (or rebuild) the summary of one study term, classify the student and record
    /// co-op eligibility. Returns `None` when no usable registration falls on that term.
    pub fn build_or_update(
        &self,
        student_id: &StudentId,
        study_year: u16,
        study_term: u8,
    ) -> Result<Option<TermSummary>, StandingError> {
        let cutoff = Cutoff::new(study_year, study_term)?;
        let student = self.student(student_id)?;
        let plan = self.plan(student.plan_id)?;

        let registrations: Vec<RegistrationRecord> = self
            .repos
            .registrations
            .find_registrations(student_id, Some(cutoff))?
            .into_iter()
            .filter(RegistrationRecord::has_usable_grade)
            .collect();
        let term_records: Vec<&RegistrationRecord> = registrations
            .iter()
            .filter(|record| record.progress() == cutoff)
            .collect();

        let Some(first) = term_records.first() else {
            warn!(student = %student_id, %cutoff, "no graded registrations for term; skipping summary");
            return Ok(None);
        };
        let (semester_year, semester_term) = (first.semester_year, first.semester_term);

        let credit_term: u32 = term_records.iter().map(|record| record.earned_credits()).sum();
        let credit_all: u32 = registrations.iter().map(RegistrationRecord::earned_credits).sum();
        let gpa = gpa_for(term_records.iter().copied());
        let gpax = gpa_for(&registrations);
        let grade_label = self.labels.resolve(gpax).map(|label| label.name.clone());

        let entries = self.plan_entries(student_id)?;
        let follows_plan = conformance::is_following_plan(&entries, cutoff);

        let tree = CategoryTree::build(&plan.categories)?;
        let requirements = self.repos.curriculum.requirements(plan.id)?;
        let credits = aggregate_credits(&tree, &entries, cutoff).term_credits(&requirements);
        let categories_met = requirements_met(&credits);

        let existing = self.repos.summaries.find_by_cutoff(student_id, cutoff)?;
        let (status, coop_eligible) = existing
            .as_ref()
            .map(|summary| (summary.status, summary.coop_eligible))
            .unwrap_or((student.status, false));

        let stored = self.repos.summaries.upsert(TermSummary {
            student_id: student_id.clone(),
            study_year: cutoff.year,
            study_term: cutoff.term,
            semester_year,
            semester_term,
            credit_term,
            credit_all,
            gpa,
            gpax,
            grade_label,
            follows_plan,
            coop_eligible,
            status,
            credits,
        })?;
        info!(
            student = %student_id,
            %cutoff,
            gpa,
            gpax,
            credit_all,
            follows_plan,
            "term summary stored"
        );

        let previous = self.previous_regular_summary(student_id, cutoff)?;
        let input = ClassificationInput {
            evaluated_term: cutoff.term,
            current: Some(TermSnapshot::from(&stored)),
            previous: previous.as_ref().map(TermSnapshot::from),
            graduation: GraduationFacts {
                total_credit: plan.total_credit,
                categories_met,
            },
        };
        let decision = self
            .classifier
            .classify(&input, || Ok::<_, StandingError>(follows_plan))?;
        debug!(student = %student_id, reason = ?decision.reason, "classifier rule matched");
        info!(
            student = %student_id,
            %cutoff,
            status = decision.status.label(),
            reason = %decision.reason.summary(),
            "student status classified"
        );
        let status = if cutoff.term.is_summer() {
            student.status
        } else {
            self.repos
                .students
                .update_status(student_id, decision.status)?;
            decision.status
        };

        let coop_eligible = coop::is_eligible_for_coop(plan.internship_credit, Some(&stored), |_| {
            Ok::<_, StandingError>(follows_plan)
        })?;
        self.repos
            .summaries
            .record_outcome(student_id, cutoff, status, coop_eligible)?;

        let summary = self
            .repos
            .summaries
            .find_by_cutoff(student_id, cutoff)?
            .ok_or_else(|| {
                StandingError::Internal(format!(
                    "term summary for {student_id} at {cutoff} vanished after upsert"
                ))
            })?;
        Ok(Some(summary))
    }

    /// Summarize the most recent term the student has registrations in.
    pub fn summarize_latest(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<TermSummary>, StandingError> {
        self.student(student_id)?;
        match self.repos.registrations.latest_registered_term(student_id)? {
            Some(latest) => self.build_or_update(student_id, latest.year, latest.term.ordinal()),
            None => {
                warn!(student = %student_id, "student has no registrations to summarize");
                Ok(None)
            }
        }
    }

    /// Summarize the latest term of every student in the directory. Students missing a
    /// plan or study plan are skipped; store and curriculum failures abort the refresh.
    pub fn summarize_cohort(&self) -> Result<Vec<TermSummary>, StandingError> {
        let mut summaries = Vec::new();
        let mut skipped = 0usize;
        for student in self.repos.students.students()? {
            match self.summarize_latest(&student.id) {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => {}
                Err(StandingError::NotFound(missing)) => {
                    warn!(student = %student.id, %missing, "skipping student in cohort refresh");
                    skipped += 1;
                }
                Err(error) => return Err(error),
            }
        }
        info!(built = summaries.len(), skipped, "cohort summaries refreshed");
        Ok(summaries)
    }

    /// Whether every required course planned up to the given term has been passed.
    pub fn is_following_plan(
        &self,
        student_id: &StudentId,
        study_year: u16,
        study_term: u8,
    ) -> Result<bool, StandingError> {
        let cutoff = Cutoff::new(study_year, study_term)?;
        self.student(student_id)?;
        self.follows_plan_at(student_id, cutoff)
    }

    /// Co-op eligibility judged at the student's latest stored summary.
    pub fn is_eligible_for_coop(&self, student_id: &StudentId) -> Result<bool, StandingError> {
        let student = self.student(student_id)?;
        let plan = self.plan(student.plan_id)?;
        let latest = self.repos.summaries.find_latest(student_id)?;

        coop::is_eligible_for_coop(plan.internship_credit, latest.as_ref(), |cutoff| {
            self.follows_plan_at(student_id, cutoff)
        })
    }

    /// Classify against stored summaries without rebuilding or persisting anything.
    pub fn classify_student(
        &self,
        student_id: &StudentId,
        study_year: u16,
        study_term: u8,
    ) -> Result<StatusDecision, StandingError> {
        let cutoff = Cutoff::new(study_year, study_term)?;
        let student = self.student(student_id)?;
        let plan = self.plan(student.plan_id)?;

        let current = self.repos.summaries.find_by_cutoff(student_id, cutoff)?;
        let previous = self.previous_regular_summary(student_id, cutoff)?;
        let input = ClassificationInput {
            evaluated_term: cutoff.term,
            current: current.as_ref().map(TermSnapshot::from),
            previous: previous.as_ref().map(TermSnapshot::from),
            graduation: GraduationFacts {
                total_credit: plan.total_credit,
                categories_met: current
                    .as_ref()
                    .map(|summary| requirements_met(&summary.credits))
                    .unwrap_or(false),
            },
        };

        self.classifier
            .classify(&input, || self.follows_plan_at(student_id, cutoff))
    }

    /// Stored summaries of a student, newest term first.
    pub fn term_summaries(&self, student_id: &StudentId) -> Result<Vec<TermSummary>, StandingError> {
        self.student(student_id)?;
        Ok(self.repos.summaries.list(student_id)?)
    }

    pub fn term_summary(
        &self,
        student_id: &StudentId,
        study_year: u16,
        study_term: u8,
    ) -> Result<TermSummary, StandingError> {
        let cutoff = Cutoff::new(study_year, study_term)?;
        self.student(student_id)?;
        self.repos
            .summaries
            .find_by_cutoff(student_id, cutoff)?
            .ok_or_else(|| {
                StandingError::NotFound(MissingEntity::TermSummary {
                    student: student_id.clone(),
                    cutoff,
                })
            })
    }

    /// Term GPA from the registrations recorded exactly at the given term.
    pub fn compute_gpa(
        &self,
        student_id: &StudentId,
        study_year: u16,
        study_term: u8,
    ) -> Result<f64, StandingError> {
        let cutoff = Cutoff::new(study_year, study_term)?;
        self.student(student_id)?;
        let records = self
            .repos
            .registrations
            .find_registrations(student_id, Some(cutoff))?;
        Ok(gpa_for(
            records.iter().filter(|record| record.progress() == cutoff),
        ))
    }

    /// Cumulative GPA over every registration on record.
    pub fn compute_gpax(&self, student_id: &StudentId) -> Result<f64, StandingError> {
        self.student(student_id)?;
        let records = self.repos.registrations.find_registrations(student_id, None)?;
        Ok(gpa_for(&records))
    }

    pub fn standing_report(&self, as_of: NaiveDate) -> Result<StandingReport, StandingError> {
        let mut entries = Vec::new();
        for student in self.repos.students.students()? {
            let plan = self.plan(student.plan_id)?;
            let requirements = self.repos.curriculum.requirements(plan.id)?;
            let latest = self.repos.summaries.find_latest(&student.id)?;
            entries.push(StandingReportEntry::new(
                &student,
                plan.total_credit,
                latest.as_ref(),
                &requirements,
            ));
        }
        Ok(StandingReport::new(as_of, entries))
    }

    fn student(&self, student_id: &StudentId) -> Result<Student, StandingError> {
        self.repos
            .students
            .student(student_id)?
            .ok_or_else(|| StandingError::NotFound(MissingEntity::Student(student_id.clone())))
    }

    fn plan(&self, plan_id: CoursePlanId) -> Result<CurriculumPlan, StandingError> {
        self.repos
            .curriculum
            .curriculum_plan(plan_id)?
            .ok_or(StandingError::NotFound(MissingEntity::CurriculumPlan(plan_id)))
    }

    fn plan_entries(&self, student_id: &StudentId) -> Result<Vec<StudentPlanEntry>, StandingError> {
        let entries = self.repos.plans.plan_entries(student_id)?;
        if entries.is_empty() {
            return Err(StandingError::NotFound(MissingEntity::StudentPlan(
                student_id.clone(),
            )));
        }
        Ok(entries)
    }

    fn follows_plan_at(&self, student_id: &StudentId, cutoff: Cutoff) -> Result<bool, StandingError> {
        let entries = self.plan_entries(student_id)?;
        Ok(conformance::is_following_plan(&entries, cutoff))
    }

    /// Latest non-summer summary strictly before `cutoff`.
    fn previous_regular_summary(
        &self,
        student_id: &StudentId,
        cutoff: Cutoff,
    ) -> Result<Option<TermSummary>, StandingError> {
        Ok(self
            .repos
            .summaries
            .list(student_id)?
            .into_iter()
            .find(|summary| summary.cutoff() < cutoff && !summary.study_term.is_summer()))
    }
}

/// The record a standing operation could not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingEntity {
    Student(StudentId),
    CurriculumPlan(CoursePlanId),
    StudentPlan(StudentId),
    TermSummary { student: StudentId, cutoff: Cutoff },
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingEntity::Student(id) => write!(f, "student {id}"),
            MissingEntity::CurriculumPlan(id) => write!(f, "curriculum plan {id}"),
            MissingEntity::StudentPlan(id) => write!(f, "study plan of student {id}"),
            MissingEntity::TermSummary { student, cutoff } => {
                write!(f, "term summary of student {student} at {cutoff}")
            }
        }
    }
}

/// Error raised by the standing service.
#[derive(Debug, thiserror::Error)]
pub enum StandingError {
    #[error("{0} not found")]
    NotFound(MissingEntity),
    #[error("conflicting write: {0}")]
    Conflict(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Curriculum(#[from] CategoryTreeError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for StandingError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => Self::Conflict(value.to_string()),
            other => Self::Repository(other),
        }
    }
}

impl From<CutoffError> for StandingError {
    fn from(value: CutoffError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}
