//! In-process store backing every standing collaborator, used for demos, fixtures and
//! tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    CoursePlanId, CurriculumPlan, CurriculumRequirement, Cutoff, RegistrationRecord, Student,
    StudentId, StudentPlanEntry, StudentStatus, TermSummary,
};
use super::ingest::Dataset;
use super::repository::{
    CurriculumCatalog, RegistrationHistory, RepositoryError, StudentDirectory, StudentPlanStore,
    TermSummaryStore,
};

#[derive(Debug, Default)]
struct StoreState {
    students: BTreeMap<StudentId, Student>,
    plans: BTreeMap<CoursePlanId, CurriculumPlan>,
    requirements: Vec<CurriculumRequirement>,
    plan_entries: BTreeMap<StudentId, Vec<StudentPlanEntry>>,
    registrations: BTreeMap<StudentId, Vec<RegistrationRecord>>,
    summaries: BTreeMap<(StudentId, Cutoff), TermSummary>,
}

#[derive(Debug, Default)]
pub struct InMemoryStandingStore {
    state: Mutex<StoreState>,
}

impl InMemoryStandingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Result<Self, RepositoryError> {
        let store = Self::new();
        for plan in dataset.plans {
            store.insert_plan(plan)?;
        }
        for requirement in dataset.requirements {
            store.insert_requirement(requirement)?;
        }
        for student in dataset.students {
            store.insert_student(student)?;
        }
        for entry in dataset.plan_entries {
            store.insert_plan_entry(entry)?;
        }
        for record in dataset.registrations {
            store.insert_registration(record)?;
        }
        Ok(store)
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("standing store lock poisoned".to_string()))
    }

    pub fn insert_student(&self, student: Student) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if state.students.contains_key(&student.id) {
            return Err(RepositoryError::Conflict);
        }
        state.students.insert(student.id.clone(), student);
        Ok(())
    }

    pub fn insert_plan(&self, plan: CurriculumPlan) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if state.plans.contains_key(&plan.id) {
            return Err(RepositoryError::Conflict);
        }
        state.plans.insert(plan.id, plan);
        Ok(())
    }

    pub fn insert_requirement(
        &self,
        requirement: CurriculumRequirement,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if state
            .requirements
            .iter()
            .any(|existing| existing.id == requirement.id)
        {
            return Err(RepositoryError::Conflict);
        }
        state.requirements.push(requirement);
        Ok(())
    }

    pub fn insert_plan_entry(&self, entry: StudentPlanEntry) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let entries = state
            .plan_entries
            .entry(entry.student_id.clone())
            .or_default();
        if entries
            .iter()
            .any(|existing| existing.subject_id == entry.subject_id)
        {
            return Err(RepositoryError::Conflict);
        }
        entries.push(entry);
        Ok(())
    }

    pub fn insert_registration(&self, record: RegistrationRecord) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state
            .registrations
            .entry(record.student_id.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    /// Replace a plan entry's pass state, standing in for the plan synchronisation job.
    pub fn replace_plan_entry(&self, entry: StudentPlanEntry) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let existing = state
            .plan_entries
            .get_mut(&entry.student_id)
            .and_then(|entries| {
                entries
                    .iter_mut()
                    .find(|existing| existing.subject_id == entry.subject_id)
            })
            .ok_or(RepositoryError::NotFound)?;
        *existing = entry;
        Ok(())
    }

    pub fn summary_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.state()?.summaries.len())
    }
}

impl StudentDirectory for InMemoryStandingStore {
    fn student(&self, student_id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        Ok(self.state()?.students.get(student_id).cloned())
    }

    fn students(&self) -> Result<Vec<Student>, RepositoryError> {
        Ok(self.state()?.students.values().cloned().collect())
    }

    fn update_status(
        &self,
        student_id: &StudentId,
        status: StudentStatus,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let student = state
            .students
            .get_mut(student_id)
            .ok_or(RepositoryError::NotFound)?;
        student.status = status;
        Ok(())
    }
}

impl RegistrationHistory for InMemoryStandingStore {
    fn find_registrations(
        &self,
        student_id: &StudentId,
        cutoff: Option<Cutoff>,
    ) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        let state = self.state()?;
        let mut records: Vec<RegistrationRecord> = state
            .registrations
            .get(student_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| cutoff.map_or(true, |cutoff| record.progress() <= cutoff))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        records.sort_by_key(RegistrationRecord::progress);
        Ok(records)
    }

    fn latest_registered_term(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<Cutoff>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .registrations
            .get(student_id)
            .and_then(|records| records.iter().map(RegistrationRecord::progress).max()))
    }
}

impl CurriculumCatalog for InMemoryStandingStore {
    fn curriculum_plan(
        &self,
        plan_id: CoursePlanId,
    ) -> Result<Option<CurriculumPlan>, RepositoryError> {
        Ok(self.state()?.plans.get(&plan_id).cloned())
    }

    fn requirements(
        &self,
        plan_id: CoursePlanId,
    ) -> Result<Vec<CurriculumRequirement>, RepositoryError> {
        Ok(self
            .state()?
            .requirements
            .iter()
            .filter(|requirement| requirement.plan_id == plan_id)
            .cloned()
            .collect())
    }
}

impl StudentPlanStore for InMemoryStandingStore {
    fn plan_entries(
        &self,
        student_id: &StudentId,
    ) -> Result<Vec<StudentPlanEntry>, RepositoryError> {
        Ok(self
            .state()?
            .plan_entries
            .get(student_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl TermSummaryStore for InMemoryStandingStore {
    fn upsert(&self, summary: TermSummary) -> Result<TermSummary, RepositoryError> {
        let mut state = self.state()?;
        let key = (summary.student_id.clone(), summary.cutoff());
        state.summaries.insert(key, summary.clone());
        Ok(summary)
    }

    fn record_outcome(
        &self,
        student_id: &StudentId,
        cutoff: Cutoff,
        status: StudentStatus,
        coop_eligible: bool,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let summary = state
            .summaries
            .get_mut(&(student_id.clone(), cutoff))
            .ok_or(RepositoryError::NotFound)?;
        summary.status = status;
        summary.coop_eligible = coop_eligible;
        Ok(())
    }

    fn find_latest(&self, student_id: &StudentId) -> Result<Option<TermSummary>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .summaries
            .values()
            .filter(|summary| &summary.student_id == student_id)
            .max_by_key(|summary| summary.cutoff())
            .cloned())
    }

    fn find_by_cutoff(
        &self,
        student_id: &StudentId,
        cutoff: Cutoff,
    ) -> Result<Option<TermSummary>, RepositoryError> {
        Ok(self
            .state()?
            .summaries
            .get(&(student_id.clone(), cutoff))
            .cloned())
    }

    fn list(&self, student_id: &StudentId) -> Result<Vec<TermSummary>, RepositoryError> {
        let state = self.state()?;
        let mut summaries: Vec<TermSummary> = state
            .summaries
            .values()
            .filter(|summary| &summary.student_id == student_id)
            .cloned()
            .collect();
        summaries.sort_by_key(|summary| std::cmp::Reverse(summary.cutoff()));
        Ok(summaries)
    }
}
