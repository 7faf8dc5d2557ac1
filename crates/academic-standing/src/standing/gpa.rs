//! Weighted grade-point averages over registration records.

use super::domain::RegistrationRecord;

/// Letter grades that complete a course without carrying grade-point weight:
/// withdrawn, incomplete, satisfactory, unsatisfactory, pass.
pub const EXCLUDED_LETTER_GRADES: [&str; 5] = ["W", "I", "S", "U", "P"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeEntry {
    pub grade_point: f64,
    pub credits: f64,
}

impl GradeEntry {
    pub const fn new(grade_point: f64, credits: f64) -> Self {
        Self {
            grade_point,
            credits,
        }
    }
}

/// `sum(grade * credit) / sum(credit)` rounded to two decimals; `0` when there is no
/// credit to weigh. Callers filter excluded grades beforehand.
pub fn calculate_gpa<I>(entries: I) -> f64
where
    I: IntoIterator<Item = GradeEntry>,
{
    let (points, credits) = entries
        .into_iter()
        .fold((0.0_f64, 0.0_f64), |(points, credits), entry| {
            (
                points + entry.grade_point * entry.credits,
                credits + entry.credits,
            )
        });

    if credits > 0.0 {
        round_to(points / credits, 2)
    } else {
        0.0
    }
}

pub fn is_excluded_letter(letter: Option<&str>) -> bool {
    letter
        .map(|value| {
            let value = value.trim();
            EXCLUDED_LETTER_GRADES
                .iter()
                .any(|excluded| value.eq_ignore_ascii_case(excluded))
        })
        .unwrap_or(false)
}

impl RegistrationRecord {
    /// The record's weight in GPA computations, or `None` when it carries no usable grade.
    pub fn grade_entry(&self) -> Option<GradeEntry> {
        if self.credits == 0 || is_excluded_letter(self.letter_grade.as_deref()) {
            return None;
        }
        self.grade_point
            .map(|grade_point| GradeEntry::new(grade_point, f64::from(self.credits)))
    }

    pub fn has_usable_grade(&self) -> bool {
        self.grade_entry().is_some()
    }
}

pub fn gpa_for<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a RegistrationRecord>,
{
    calculate_gpa(records.into_iter().filter_map(RegistrationRecord::grade_entry))
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}
