use std::sync::Arc;

use super::domain::{
    CoursePlanId, CurriculumPlan, CurriculumRequirement, Cutoff, RegistrationRecord, Student,
    StudentId, StudentPlanEntry, StudentStatus, TermSummary,
};

/// Read access to graded course registrations.
pub trait RegistrationHistory: Send + Sync {
    /// Registrations of a student, ascending by study progress term. With a cutoff,
    /// only registrations at or before it are returned.
    fn find_registrations(
        &self,
        student_id: &StudentId,
        cutoff: Option<Cutoff>,
    ) -> Result<Vec<RegistrationRecord>, RepositoryError>;

    fn latest_registered_term(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<Cutoff>, RepositoryError>;
}

/// Static curriculum reference data.
pub trait CurriculumCatalog: Send + Sync {
    fn curriculum_plan(
        &self,
        plan_id: CoursePlanId,
    ) -> Result<Option<CurriculumPlan>, RepositoryError>;

    fn requirements(
        &self,
        plan_id: CoursePlanId,
    ) -> Result<Vec<CurriculumRequirement>, RepositoryError>;
}

/// Pass/fail state of each required course of a student's plan.
pub trait StudentPlanStore: Send + Sync {
    fn plan_entries(&self, student_id: &StudentId)
        -> Result<Vec<StudentPlanEntry>, RepositoryError>;
}

/// Durable term summaries. `upsert` must replace the summary and its credit rows in a
/// single atomic write.
pub trait TermSummaryStore: Send + Sync {
    fn upsert(&self, summary: TermSummary) -> Result<TermSummary, RepositoryError>;

    /// Follow-up write of the classifier verdict and co-op flag; safe to repeat.
    fn record_outcome(
        &self,
        student_id: &StudentId,
        cutoff: Cutoff,
        status: StudentStatus,
        coop_eligible: bool,
    ) -> Result<(), RepositoryError>;

    fn find_latest(&self, student_id: &StudentId) -> Result<Option<TermSummary>, RepositoryError>;

    fn find_by_cutoff(
        &self,
        student_id: &StudentId,
        cutoff: Cutoff,
    ) -> Result<Option<TermSummary>, RepositoryError>;

    /// Every summary of a student, newest term first.
    fn list(&self, student_id: &StudentId) -> Result<Vec<TermSummary>, RepositoryError>;
}

pub trait StudentDirectory: Send + Sync {
    fn student(&self, student_id: &StudentId) -> Result<Option<Student>, RepositoryError>;

    fn students(&self) -> Result<Vec<Student>, RepositoryError>;

    fn update_status(
        &self,
        student_id: &StudentId,
        status: StudentStatus,
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// The collaborators a standing service reads from and writes to.
#[derive(Clone)]
pub struct StandingRepositories {
    pub students: Arc<dyn StudentDirectory>,
    pub registrations: Arc<dyn RegistrationHistory>,
    pub curriculum: Arc<dyn CurriculumCatalog>,
    pub plans: Arc<dyn StudentPlanStore>,
    pub summaries: Arc<dyn TermSummaryStore>,
}

impl StandingRepositories {
    /// Wire every collaborator to one backing store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: StudentDirectory
            + RegistrationHistory
            + CurriculumCatalog
            + StudentPlanStore
            + TermSummaryStore
            + 'static,
    {
        Self {
            students: store.clone(),
            registrations: store.clone(),
            curriculum: store.clone(),
            plans: store.clone(),
            summaries: store,
        }
    }
}
