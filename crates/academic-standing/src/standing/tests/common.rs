use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::standing::domain::{
    CategoryId, CoursePlanId, CurriculumPlan, CurriculumRequirement, Cutoff, RegistrationRecord,
    Student, StudentId, StudentPlanEntry, StudentStatus, SubjectCategory, SubjectId, Term,
    TermSummary,
};
use crate::standing::evaluation::{
    ClassificationInput, GraduationFacts, StandingThresholds, TermSnapshot,
};
use crate::standing::ingest::{Dataset, RegistrationNormalizer};
use crate::standing::memory::InMemoryStandingStore;
use crate::standing::repository::{
    CurriculumCatalog, RegistrationHistory, RepositoryError, StandingRepositories,
    StudentDirectory, StudentPlanStore, TermSummaryStore,
};
use crate::standing::service::StandingService;

pub(super) const STUDENT: &str = "6620500101";
pub(super) const PLAN: CoursePlanId = CoursePlanId(7);

pub(super) fn student_id() -> StudentId {
    StudentId(STUDENT.to_string())
}

pub(super) fn snapshot(gpax: f64, credit_all: u32, year: u16, term: Term) -> TermSnapshot {
    TermSnapshot {
        gpax,
        credit_all,
        cutoff: Cutoff::of(year, term),
    }
}

pub(super) fn input(
    evaluated_term: Term,
    current: Option<TermSnapshot>,
    previous: Option<TermSnapshot>,
    total_credit: u32,
    categories_met: bool,
) -> ClassificationInput {
    ClassificationInput {
        evaluated_term,
        current,
        previous,
        graduation: GraduationFacts {
            total_credit,
            categories_met,
        },
    }
}

/// General (1) with Language (2) beneath it, and Major (3) as a second root.
pub(super) fn categories() -> Vec<SubjectCategory> {
    vec![
        SubjectCategory {
            id: CategoryId(1),
            name: "General".to_string(),
            group: "General Education".to_string(),
            parent: None,
        },
        SubjectCategory {
            id: CategoryId(2),
            name: "Language".to_string(),
            group: "General Education".to_string(),
            parent: Some(CategoryId(1)),
        },
        SubjectCategory {
            id: CategoryId(3),
            name: "Major".to_string(),
            group: "Specific Courses".to_string(),
            parent: None,
        },
    ]
}

pub(super) fn plan(categories: Vec<SubjectCategory>) -> CurriculumPlan {
    CurriculumPlan {
        id: PLAN,
        name: "B.Sc. Data Science".to_string(),
        total_credit: 12,
        internship_credit: 6,
        categories,
    }
}

pub(super) fn requirements() -> Vec<CurriculumRequirement> {
    vec![
        CurriculumRequirement {
            id: 1,
            plan_id: PLAN,
            category_id: CategoryId(1),
            required_credit: 3,
            due: Some(Cutoff::of(1, Term::Second)),
        },
        CurriculumRequirement {
            id: 2,
            plan_id: PLAN,
            category_id: CategoryId(3),
            required_credit: 9,
            due: None,
        },
    ]
}

pub(super) fn registration(
    subject: &str,
    year: u16,
    term: Term,
    grade: Option<(f64, &str)>,
    credits: u32,
) -> RegistrationRecord {
    RegistrationRecord {
        student_id: student_id(),
        subject_id: SubjectId(subject.to_string()),
        semester_year: 2566 + year - 1,
        semester_term: term,
        study_year: year,
        study_term: term,
        grade_point: grade.map(|(point, _)| point),
        letter_grade: grade.map(|(_, letter)| letter.to_string()),
        credits,
    }
}

pub(super) fn plan_entry(
    subject: &str,
    planned: Cutoff,
    category: u32,
    passed: Option<(f64, Cutoff)>,
) -> StudentPlanEntry {
    StudentPlanEntry {
        student_id: student_id(),
        subject_id: SubjectId(subject.to_string()),
        planned_year: planned.year,
        planned_term: planned.term,
        category_id: CategoryId(category),
        credits: 3,
        is_pass: passed.is_some(),
        grade_point: passed.map(|(grade, _)| grade),
        pass_year: passed.map(|(_, at)| at.year),
        pass_term: passed.map(|(_, at)| at.term),
    }
}

/// Store holding the test plan and one active student without history.
pub(super) fn seeded_store() -> Arc<InMemoryStandingStore> {
    seeded_store_with(categories())
}

pub(super) fn seeded_store_with(categories: Vec<SubjectCategory>) -> Arc<InMemoryStandingStore> {
    let store = InMemoryStandingStore::new();
    store.insert_plan(plan(categories)).expect("plan inserts");
    for requirement in requirements() {
        store
            .insert_requirement(requirement)
            .expect("requirement inserts");
    }
    store
        .insert_student(Student {
            id: student_id(),
            name: "Kanokwan Phrom".to_string(),
            plan_id: PLAN,
            status: StudentStatus::Active,
        })
        .expect("student inserts");
    Arc::new(store)
}

pub(super) fn seed_plan_entries(store: &InMemoryStandingStore, entries: Vec<StudentPlanEntry>) {
    for entry in entries {
        store.insert_plan_entry(entry).expect("plan entry inserts");
    }
}

pub(super) fn seed_registrations(store: &InMemoryStandingStore, records: Vec<RegistrationRecord>) {
    for record in records {
        store
            .insert_registration(record)
            .expect("registration inserts");
    }
}

pub(super) fn service_for(store: Arc<InMemoryStandingStore>) -> StandingService {
    StandingService::new(
        StandingRepositories::from_store(store),
        StandingThresholds::default(),
    )
}

pub(super) fn bundled_service() -> (StandingService, Arc<InMemoryStandingStore>) {
    let dataset = Dataset::bundled(&RegistrationNormalizer::default()).expect("bundled dataset");
    let store = Arc::new(InMemoryStandingStore::from_dataset(dataset).expect("dataset loads"));
    (service_for(store.clone()), store)
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}

/// Store whose every call fails as if the database were down.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("connection refused".to_string()))
}

impl StudentDirectory for UnavailableStore {
    fn student(&self, _student_id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        offline()
    }

    fn students(&self) -> Result<Vec<Student>, RepositoryError> {
        offline()
    }

    fn update_status(
        &self,
        _student_id: &StudentId,
        _status: StudentStatus,
    ) -> Result<(), RepositoryError> {
        offline()
    }
}

impl RegistrationHistory for UnavailableStore {
    fn find_registrations(
        &self,
        _student_id: &StudentId,
        _cutoff: Option<Cutoff>,
    ) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        offline()
    }

    fn latest_registered_term(
        &self,
        _student_id: &StudentId,
    ) -> Result<Option<Cutoff>, RepositoryError> {
        offline()
    }
}

impl CurriculumCatalog for UnavailableStore {
    fn curriculum_plan(
        &self,
        _plan_id: CoursePlanId,
    ) -> Result<Option<CurriculumPlan>, RepositoryError> {
        offline()
    }

    fn requirements(
        &self,
        _plan_id: CoursePlanId,
    ) -> Result<Vec<CurriculumRequirement>, RepositoryError> {
        offline()
    }
}

impl StudentPlanStore for UnavailableStore {
    fn plan_entries(
        &self,
        _student_id: &StudentId,
    ) -> Result<Vec<StudentPlanEntry>, RepositoryError> {
        offline()
    }
}

impl TermSummaryStore for UnavailableStore {
    fn upsert(&self, _summary: TermSummary) -> Result<TermSummary, RepositoryError> {
        offline()
    }

    fn record_outcome(
        &self,
        _student_id: &StudentId,
        _cutoff: Cutoff,
        _status: StudentStatus,
        _coop_eligible: bool,
    ) -> Result<(), RepositoryError> {
        offline()
    }

    fn find_latest(&self, _student_id: &StudentId) -> Result<Option<TermSummary>, RepositoryError> {
        offline()
    }

    fn find_by_cutoff(
        &self,
        _student_id: &StudentId,
        _cutoff: Cutoff,
    ) -> Result<Option<TermSummary>, RepositoryError> {
        offline()
    }

    fn list(&self, _student_id: &StudentId) -> Result<Vec<TermSummary>, RepositoryError> {
        offline()
    }
}

pub(super) fn unavailable_service() -> StandingService {
    StandingService::new(
        StandingRepositories::from_store(Arc::new(UnavailableStore)),
        StandingThresholds::default(),
    )
}
