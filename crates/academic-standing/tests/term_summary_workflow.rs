use std::path::PathBuf;
use std::sync::Arc;

use academic_standing::standing::{
    CoursePlanId, Dataset, DecisionReason, InMemoryStandingStore, RegistrationNormalizer,
    RegistrationRecord, StandingRepositories, StandingService, StandingThresholds, Student,
    StudentDirectory, StudentId, StudentStatus, SubjectId, Term,
};
use chrono::NaiveDate;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn service() -> (StandingService, Arc<InMemoryStandingStore>) {
    let dataset = Dataset::from_dir(fixtures_dir(), &RegistrationNormalizer::default())
        .expect("fixture exports load");
    let store = Arc::new(InMemoryStandingStore::from_dataset(dataset).expect("store seeds"));
    let service = StandingService::new(
        StandingRepositories::from_store(store.clone()),
        StandingThresholds::default(),
    );
    (service, store)
}

fn student(raw: &str) -> StudentId {
    StudentId(raw.to_string())
}

#[test]
fn fixture_directory_matches_bundled_dataset() {
    let from_dir = Dataset::from_dir(fixtures_dir(), &RegistrationNormalizer::default())
        .expect("directory loads");
    let bundled = Dataset::bundled(&RegistrationNormalizer::default()).expect("bundled loads");
    assert_eq!(from_dir, bundled);
}

#[test]
fn steady_student_graduates_after_final_term() {
    let (service, store) = service();
    let id = student("6520500001");

    let terms = [(1, 1), (1, 2), (2, 1), (2, 2)];
    let mut summaries = Vec::new();
    for (year, term) in terms {
        summaries.push(
            service
                .build_or_update(&id, year, term)
                .expect("term builds")
                .expect("graded term"),
        );
    }

    assert_eq!(summaries[0].gpax, 3.75);
    assert!(!summaries[0].coop_eligible);
    assert!(summaries[1].coop_eligible);
    // withdrawn course is neither weighed nor credited
    assert_eq!(summaries[2].credit_term, 6);
    assert_eq!(summaries[2].gpax, 3.58);

    let last = &summaries[3];
    assert_eq!(last.credit_all, 24);
    assert_eq!(last.gpax, 3.63);
    assert_eq!(last.grade_label.as_deref(), Some("Honors"));
    assert!(last.credits.iter().all(|credit| credit.is_satisfied()));
    assert_eq!(last.status, StudentStatus::Graduated);

    let record = store.student(&id).expect("lookup").expect("present");
    assert_eq!(record.status, StudentStatus::Graduated);
}

#[test]
fn struggling_student_is_dismissed_after_probation() {
    let (service, store) = service();
    let id = student("6520500002");

    let first = service
        .build_or_update(&id, 1, 1)
        .expect("builds")
        .expect("graded");
    assert_eq!(first.gpax, 1.25);
    assert_eq!(first.status, StudentStatus::Active);

    let second = service
        .build_or_update(&id, 1, 2)
        .expect("builds")
        .expect("graded");
    assert_eq!(second.gpax, 1.75);
    assert_eq!(second.grade_label.as_deref(), Some("Probation"));
    assert_eq!(second.status, StudentStatus::Active);

    let third = service
        .build_or_update(&id, 2, 1)
        .expect("builds")
        .expect("graded");
    assert_eq!(third.gpax, 1.33);
    assert_eq!(third.credit_term, 3);
    assert_eq!(third.credit_all, 15);
    assert!(!third.follows_plan);
    assert_eq!(third.status, StudentStatus::Expelled);

    let decision = service.classify_student(&id, 2, 1).expect("classifies");
    assert_eq!(decision.reason, DecisionReason::CriticalGpax { gpax: 1.33 });
    let record = store.student(&id).expect("lookup").expect("present");
    assert_eq!(record.status, StudentStatus::Expelled);
}

#[test]
fn summer_retake_restores_progress_without_changing_status() {
    let (service, _) = service();
    let id = student("6520500003");

    for (year, term) in [(1, 1), (1, 2)] {
        service.build_or_update(&id, year, term).expect("builds");
    }
    let second = service.term_summary(&id, 1, 2).expect("stored");
    assert_eq!(second.gpa, 1.75);
    assert_eq!(second.gpax, 2.13);
    assert_eq!(second.credit_term, 3);

    let summer = service
        .build_or_update(&id, 1, 3)
        .expect("builds")
        .expect("graded");
    assert_eq!(summer.semester_term, Term::Summer);
    assert_eq!(summer.semester_year, 2565);
    assert_eq!(summer.gpax, 2.3);
    assert_eq!(summer.credit_all, 12);
    assert_eq!(summer.status, StudentStatus::Active);
    assert!(summer.coop_eligible);

    assert!(service.is_eligible_for_coop(&id).expect("coop check"));
    assert_eq!(service.summarize_latest(&id).expect("latest"), None);
}

#[test]
fn newcomer_has_nothing_to_summarize() {
    let (service, _) = service();
    let id = student("6520500004");

    assert_eq!(service.summarize_latest(&id).expect("latest"), None);
    assert!(!service.is_eligible_for_coop(&id).expect("coop check"));
    assert!(service.term_summaries(&id).expect("list").is_empty());
}

#[test]
fn standing_report_covers_the_cohort() {
    let (service, _) = service();
    for (raw, year, term) in [
        ("6520500001", 1, 2),
        ("6520500002", 1, 1),
        ("6520500002", 1, 2),
        ("6520500002", 2, 1),
    ] {
        service
            .build_or_update(&student(raw), year, term)
            .expect("builds");
    }

    let report = service
        .standing_report(NaiveDate::from_ymd_opt(2024, 5, 31).expect("valid date"))
        .expect("report builds");
    assert_eq!(report.entries.len(), 4);

    let counts = report.status_counts();
    assert_eq!(counts.get("active"), Some(&3));
    assert_eq!(counts.get("expelled"), Some(&1));

    let rendered = report.render();
    assert!(rendered.contains("Generated 2024-05-31 for 4 students"));
    assert!(rendered.contains("Boonsong Keawmanee (6520500002) expelled at year 2 first term"));
    assert!(rendered.contains("Danai Wongsawat (6520500004) active: no term summaries yet"));
    assert!(rendered.contains("Boonsong Keawmanee (6520500002) has required courses outstanding"));
}

#[test]
fn cohort_refresh_skips_students_without_graded_latest_term() {
    let (service, _) = service();

    let summaries = service.summarize_cohort().expect("cohort builds");
    let built: Vec<&str> = summaries
        .iter()
        .map(|summary| summary.student_id.0.as_str())
        .collect();
    assert_eq!(built, vec!["6520500001", "6520500002"]);
    assert_eq!(summaries[0].status, StudentStatus::Graduated);
}

#[test]
fn cohort_refresh_survives_a_student_without_a_study_plan() {
    let (service, store) = service();
    let late = student("6520500005");
    store
        .insert_student(Student {
            id: late.clone(),
            name: "Ekkachai Thongdee".to_string(),
            plan_id: CoursePlanId(1),
            status: StudentStatus::Active,
        })
        .expect("student inserts");
    store
        .insert_registration(RegistrationRecord {
            student_id: late.clone(),
            subject_id: SubjectId("CE101".to_string()),
            semester_year: 2565,
            semester_term: Term::First,
            study_year: 1,
            study_term: Term::First,
            grade_point: Some(3.0),
            letter_grade: Some("B".to_string()),
            credits: 3,
        })
        .expect("registration inserts");

    let summaries = service.summarize_cohort().expect("cohort builds");
    let built: Vec<&str> = summaries
        .iter()
        .map(|summary| summary.student_id.0.as_str())
        .collect();
    assert_eq!(built, vec!["6520500001", "6520500002"]);

    let report = service
        .standing_report(NaiveDate::from_ymd_opt(2024, 5, 31).expect("valid date"))
        .expect("report builds");
    assert_eq!(report.entries.len(), 5);
    assert_eq!(report.status_counts().get("graduated"), Some(&1));
    assert_eq!(report.status_counts().get("expelled"), Some(&1));
}

#[test]
fn summer_year_correction_is_applied_at_ingestion() {
    let dataset = Dataset::from_dir(fixtures_dir(), &RegistrationNormalizer::new(2))
        .expect("fixture exports load");
    let summer: Vec<_> = dataset
        .registrations
        .iter()
        .filter(|record| record.semester_term.is_summer())
        .collect();
    assert_eq!(summer.len(), 1);
    assert_eq!(summer[0].semester_year, 2563);
    assert!(dataset
        .registrations
        .iter()
        .filter(|record| !record.semester_term.is_summer())
        .all(|record| record.semester_year >= 2565));
}
