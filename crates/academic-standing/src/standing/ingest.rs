//! CSV ingestion of registrar exports into the standing domain.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::domain::{
    CategoryId, CoursePlanId, CurriculumPlan, CurriculumRequirement, Cutoff, CutoffError,
    RegistrationRecord, Student, StudentId, StudentPlanEntry, StudentStatus, SubjectCategory,
    SubjectId, Term,
};

pub const STUDENTS_FILE: &str = "students.csv";
pub const COURSE_PLANS_FILE: &str = "course_plans.csv";
pub const CATEGORIES_FILE: &str = "categories.csv";
pub const REQUIREMENTS_FILE: &str = "requirements.csv";
pub const PLAN_ENTRIES_FILE: &str = "plan_entries.csv";
pub const REGISTRATIONS_FILE: &str = "registrations.csv";

#[derive(Debug)]
pub enum IngestError {
    Io { path: PathBuf, source: std::io::Error },
    Csv { file: &'static str, source: csv::Error },
    InvalidRow { file: &'static str, row: usize, reason: String },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            IngestError::Csv { file, source } => write!(f, "invalid CSV data in {}: {}", file, source),
            IngestError::InvalidRow { file, row, reason } => {
                write!(f, "{} row {}: {}", file, row, reason)
            }
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io { source, .. } => Some(source),
            IngestError::Csv { source, .. } => Some(source),
            IngestError::InvalidRow { .. } => None,
        }
    }
}

/// Corrects the calendar year of summer registrations.
///
/// Some registrar exports store summer rows with the calendar year shifted forward; the
/// offset is subtracted from summer rows only. An offset of `0` leaves records untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationNormalizer {
    summer_year_offset: u16,
}

impl RegistrationNormalizer {
    pub const fn new(summer_year_offset: u16) -> Self {
        Self { summer_year_offset }
    }

    pub const fn summer_year_offset(&self) -> u16 {
        self.summer_year_offset
    }

    pub fn normalize(&self, mut record: RegistrationRecord) -> RegistrationRecord {
        if record.semester_term.is_summer() {
            record.semester_year = record.semester_year.saturating_sub(self.summer_year_offset);
        }
        record
    }
}

/// Everything needed to populate a standing store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub students: Vec<Student>,
    pub plans: Vec<CurriculumPlan>,
    pub requirements: Vec<CurriculumRequirement>,
    pub plan_entries: Vec<StudentPlanEntry>,
    pub registrations: Vec<RegistrationRecord>,
}

/// One reader per export file.
pub struct DatasetReaders<R> {
    pub students: R,
    pub course_plans: R,
    pub categories: R,
    pub requirements: R,
    pub plan_entries: R,
    pub registrations: R,
}

impl Dataset {
    pub fn from_readers<R: Read>(
        readers: DatasetReaders<R>,
        normalizer: &RegistrationNormalizer,
    ) -> Result<Self, IngestError> {
        let categories = read_categories(readers.categories)?;
        Ok(Self {
            students: read_students(readers.students)?,
            plans: read_course_plans(readers.course_plans, &categories)?,
            requirements: read_requirements(readers.requirements)?,
            plan_entries: read_plan_entries(readers.plan_entries)?,
            registrations: read_registrations(readers.registrations, normalizer)?,
        })
    }

    pub fn from_dir<P: AsRef<Path>>(
        dir: P,
        normalizer: &RegistrationNormalizer,
    ) -> Result<Self, IngestError> {
        let dir = dir.as_ref();
        let open = |name: &str| {
            let path = dir.join(name);
            File::open(&path).map_err(|source| IngestError::Io { path, source })
        };

        let readers = DatasetReaders {
            students: open(STUDENTS_FILE)?,
            course_plans: open(COURSE_PLANS_FILE)?,
            categories: open(CATEGORIES_FILE)?,
            requirements: open(REQUIREMENTS_FILE)?,
            plan_entries: open(PLAN_ENTRIES_FILE)?,
            registrations: open(REGISTRATIONS_FILE)?,
        };
        Self::from_readers(readers, normalizer)
    }

    /// Sample cohort shipped with the crate for demos and smoke tests.
    pub fn bundled(normalizer: &RegistrationNormalizer) -> Result<Self, IngestError> {
        let readers = DatasetReaders {
            students: include_str!("../../fixtures/students.csv").as_bytes(),
            course_plans: include_str!("../../fixtures/course_plans.csv").as_bytes(),
            categories: include_str!("../../fixtures/categories.csv").as_bytes(),
            requirements: include_str!("../../fixtures/requirements.csv").as_bytes(),
            plan_entries: include_str!("../../fixtures/plan_entries.csv").as_bytes(),
            registrations: include_str!("../../fixtures/registrations.csv").as_bytes(),
        };
        Self::from_readers(readers, normalizer)
    }
}

fn read_rows<R, T>(file: &'static str, reader: R) -> Result<Vec<(usize, T)>, IngestError>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, result) in csv_reader.deserialize::<T>().enumerate() {
        let row = result.map_err(|source| IngestError::Csv { file, source })?;
        // header is row 1
        rows.push((index + 2, row));
    }

    Ok(rows)
}

fn term_of(file: &'static str, row: usize, value: u8) -> Result<Term, IngestError> {
    Term::try_from(value).map_err(|err| invalid(file, row, err))
}

fn cutoff_of(file: &'static str, row: usize, year: u16, term: u8) -> Result<Cutoff, IngestError> {
    Cutoff::new(year, term).map_err(|err| invalid(file, row, err))
}

fn invalid(file: &'static str, row: usize, err: CutoffError) -> IngestError {
    IngestError::InvalidRow {
        file,
        row,
        reason: err.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct StudentRow {
    student_id: String,
    name: String,
    course_plan_id: u32,
    status: Option<String>,
}

pub fn read_students<R: Read>(reader: R) -> Result<Vec<Student>, IngestError> {
    read_rows::<_, StudentRow>(STUDENTS_FILE, reader)?
        .into_iter()
        .map(|(row, record)| {
            let status = match record.status.as_deref() {
                None => StudentStatus::Active,
                Some(raw) => StudentStatus::parse(raw).ok_or_else(|| IngestError::InvalidRow {
                    file: STUDENTS_FILE,
                    row,
                    reason: format!("unknown student status '{raw}'"),
                })?,
            };
            Ok(Student {
                id: StudentId(record.student_id),
                name: record.name,
                plan_id: CoursePlanId(record.course_plan_id),
                status,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    category_id: u32,
    name: String,
    group_name: String,
    parent_id: Option<u32>,
}

pub fn read_categories<R: Read>(reader: R) -> Result<Vec<SubjectCategory>, IngestError> {
    Ok(read_rows::<_, CategoryRow>(CATEGORIES_FILE, reader)?
        .into_iter()
        .map(|(_, record)| SubjectCategory {
            id: CategoryId(record.category_id),
            name: record.name,
            group: record.group_name,
            parent: record.parent_id.map(CategoryId),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct CoursePlanRow {
    course_plan_id: u32,
    name: String,
    total_credit: u32,
    internship_credit: u32,
}

/// Plans share the registrar's category taxonomy.
pub fn read_course_plans<R: Read>(
    reader: R,
    categories: &[SubjectCategory],
) -> Result<Vec<CurriculumPlan>, IngestError> {
    let mut plans = BTreeMap::new();
    for (row, record) in read_rows::<_, CoursePlanRow>(COURSE_PLANS_FILE, reader)? {
        let plan = CurriculumPlan {
            id: CoursePlanId(record.course_plan_id),
            name: record.name,
            total_credit: record.total_credit,
            internship_credit: record.internship_credit,
            categories: categories.to_vec(),
        };
        if plans.insert(plan.id, plan).is_some() {
            return Err(IngestError::InvalidRow {
                file: COURSE_PLANS_FILE,
                row,
                reason: format!("course plan {} listed twice", record.course_plan_id),
            });
        }
    }
    Ok(plans.into_values().collect())
}

#[derive(Debug, Deserialize)]
struct RequirementRow {
    requirement_id: u32,
    course_plan_id: u32,
    category_id: u32,
    required_credit: u32,
    due_year: Option<u16>,
    due_term: Option<u8>,
}

pub fn read_requirements<R: Read>(reader: R) -> Result<Vec<CurriculumRequirement>, IngestError> {
    read_rows::<_, RequirementRow>(REQUIREMENTS_FILE, reader)?
        .into_iter()
        .map(|(row, record)| {
            let due = match (record.due_year, record.due_term) {
                (Some(year), Some(term)) => Some(cutoff_of(REQUIREMENTS_FILE, row, year, term)?),
                (None, None) => None,
                _ => {
                    return Err(IngestError::InvalidRow {
                        file: REQUIREMENTS_FILE,
                        row,
                        reason: "due_year and due_term must be given together".to_string(),
                    })
                }
            };
            Ok(CurriculumRequirement {
                id: record.requirement_id,
                plan_id: CoursePlanId(record.course_plan_id),
                category_id: CategoryId(record.category_id),
                required_credit: record.required_credit,
                due,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct PlanEntryRow {
    student_id: String,
    subject_id: String,
    planned_year: u16,
    planned_term: u8,
    category_id: u32,
    credits: u32,
    is_pass: bool,
    grade_point: Option<f64>,
    pass_year: Option<u16>,
    pass_term: Option<u8>,
}

pub fn read_plan_entries<R: Read>(reader: R) -> Result<Vec<StudentPlanEntry>, IngestError> {
    read_rows::<_, PlanEntryRow>(PLAN_ENTRIES_FILE, reader)?
        .into_iter()
        .map(|(row, record)| {
            let planned = cutoff_of(PLAN_ENTRIES_FILE, row, record.planned_year, record.planned_term)?;
            let pass_term = record
                .pass_term
                .map(|term| term_of(PLAN_ENTRIES_FILE, row, term))
                .transpose()?;
            Ok(StudentPlanEntry {
                student_id: StudentId(record.student_id),
                subject_id: SubjectId(record.subject_id),
                planned_year: planned.year,
                planned_term: planned.term,
                category_id: CategoryId(record.category_id),
                credits: record.credits,
                is_pass: record.is_pass,
                grade_point: record.grade_point,
                pass_year: record.pass_year,
                pass_term,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RegistrationRow {
    student_id: String,
    subject_id: String,
    semester_year: u16,
    semester_term: u8,
    study_year: u16,
    study_term: u8,
    grade_point: Option<f64>,
    letter_grade: Option<String>,
    credits: u32,
}

pub fn read_registrations<R: Read>(
    reader: R,
    normalizer: &RegistrationNormalizer,
) -> Result<Vec<RegistrationRecord>, IngestError> {
    read_rows::<_, RegistrationRow>(REGISTRATIONS_FILE, reader)?
        .into_iter()
        .map(|(row, record)| {
            let progress =
                cutoff_of(REGISTRATIONS_FILE, row, record.study_year, record.study_term)?;
            let semester_term = term_of(REGISTRATIONS_FILE, row, record.semester_term)?;
            Ok(normalizer.normalize(RegistrationRecord {
                student_id: StudentId(record.student_id),
                subject_id: SubjectId(record.subject_id),
                semester_year: record.semester_year,
                semester_term,
                study_year: progress.year,
                study_term: progress.term,
                grade_point: record.grade_point,
                letter_grade: record.letter_grade,
                credits: record.credits,
            }))
        })
        .collect()
}
