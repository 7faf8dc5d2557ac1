//! Term evaluation for academic standing: GPA, credit roll-ups, plan conformance, co-op
//! eligibility and the active / expelled / graduated classifier.

pub mod conformance;
pub mod coop;
pub mod credits;
pub mod domain;
pub mod evaluation;
pub mod gpa;
pub mod ingest;
pub mod labels;
pub mod memory;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use credits::{CategoryTree, CategoryTreeError, CreditAggregate};
pub use domain::{
    CategoryId, CoursePlanId, CurriculumPlan, CurriculumRequirement, Cutoff, CutoffError,
    RegistrationRecord, Student, StudentId, StudentPlanEntry, StudentStatus, SubjectCategory,
    SubjectId, Term, TermCredit, TermSummary,
};
pub use evaluation::{
    ClassificationInput, DecisionReason, GraduationFacts, StandingThresholds, StatusClassifier,
    StatusDecision, TermSnapshot,
};
pub use gpa::{calculate_gpa, GradeEntry};
pub use ingest::{Dataset, IngestError, RegistrationNormalizer};
pub use labels::{GradeLabel, GradeLabelSet};
pub use memory::InMemoryStandingStore;
pub use report::{StandingReport, StandingReportEntry};
pub use repository::{
    CurriculumCatalog, RegistrationHistory, RepositoryError, StandingRepositories,
    StudentDirectory, StudentPlanStore, TermSummaryStore,
};
pub use router::standing_router;
pub use service::{MissingEntity, StandingError, StandingService};
