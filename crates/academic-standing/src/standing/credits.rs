//! Passed-credit aggregation per subject category with hierarchy roll-ups.

use std::collections::{BTreeMap, BTreeSet};

use super::domain::{
    CategoryId, Cutoff, CurriculumRequirement, StudentPlanEntry, SubjectCategory, TermCredit,
};
use super::gpa::round_to;

/// Malformed category configuration detected while building the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryTreeError {
    #[error("subject category {0} is defined more than once")]
    Duplicate(CategoryId),
    #[error("subject category {child} references unknown parent {parent}")]
    UnknownParent { child: CategoryId, parent: CategoryId },
    #[error("subject category hierarchy contains a cycle through {0}")]
    Cycle(CategoryId),
}

/// Parent-pointer tree of a plan's categories, validated acyclic on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    parents: BTreeMap<CategoryId, Option<CategoryId>>,
}

impl CategoryTree {
    pub fn build(categories: &[SubjectCategory]) -> Result<Self, CategoryTreeError> {
        let mut parents = BTreeMap::new();
        for category in categories {
            if parents.insert(category.id, category.parent).is_some() {
                return Err(CategoryTreeError::Duplicate(category.id));
            }
        }

        for (&child, parent) in &parents {
            if let Some(parent) = *parent {
                if !parents.contains_key(&parent) {
                    return Err(CategoryTreeError::UnknownParent { child, parent });
                }
            }
        }

        for &start in parents.keys() {
            let mut seen = BTreeSet::from([start]);
            let mut cursor = parents.get(&start).copied().flatten();
            while let Some(node) = cursor {
                if !seen.insert(node) {
                    return Err(CategoryTreeError::Cycle(node));
                }
                cursor = parents.get(&node).copied().flatten();
            }
        }

        Ok(Self { parents })
    }

    /// The category followed by each of its ancestors up to the root. Categories the
    /// tree does not know about only count toward themselves.
    pub fn lineage(&self, category: CategoryId) -> Vec<CategoryId> {
        let mut chain = vec![category];
        let mut cursor = self.parents.get(&category).copied().flatten();
        while let Some(parent) = cursor {
            chain.push(parent);
            cursor = self.parents.get(&parent).copied().flatten();
        }
        chain
    }
}

/// Running credit and grade totals for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryTally {
    pub credits: u32,
    weighted_grade: f64,
    graded_credits: u32,
}

impl CategoryTally {
    fn add(&mut self, entry: &StudentPlanEntry) {
        self.credits += entry.credits;
        if let Some(grade) = entry.grade_point {
            self.weighted_grade += grade * f64::from(entry.credits);
            self.graded_credits += entry.credits;
        }
    }

    /// Credit-weighted grade average, `0` when nothing graded contributed.
    pub fn average_grade(&self) -> f64 {
        if self.graded_credits == 0 {
            0.0
        } else {
            round_to(self.weighted_grade / f64::from(self.graded_credits), 3)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditAggregate {
    tallies: BTreeMap<CategoryId, CategoryTally>,
}

impl CreditAggregate {
    pub fn tally(&self, category: CategoryId) -> CategoryTally {
        self.tallies.get(&category).copied().unwrap_or_default()
    }

    /// One credit row per requirement, with passed credit capped at the requirement.
    pub fn term_credits(&self, requirements: &[CurriculumRequirement]) -> Vec<TermCredit> {
        requirements
            .iter()
            .map(|requirement| {
                let tally = self.tally(requirement.category_id);
                TermCredit {
                    requirement_id: requirement.id,
                    category_id: requirement.category_id,
                    credit_required: requirement.required_credit,
                    credit_passed: tally.credits.min(requirement.required_credit),
                    average_grade: tally.average_grade(),
                }
            })
            .collect()
    }
}

/// Sum credits of courses passed at or before `cutoff`, attributing each course to its
/// category and every ancestor category.
pub fn aggregate_credits(
    tree: &CategoryTree,
    entries: &[StudentPlanEntry],
    cutoff: Cutoff,
) -> CreditAggregate {
    let mut tallies: BTreeMap<CategoryId, CategoryTally> = BTreeMap::new();

    for entry in entries {
        let Some(passed_at) = entry.passed_at() else {
            continue;
        };
        if passed_at > cutoff {
            continue;
        }

        for category in tree.lineage(entry.category_id) {
            tallies.entry(category).or_default().add(entry);
        }
    }

    CreditAggregate { tallies }
}

pub fn requirements_met(credits: &[TermCredit]) -> bool {
    credits.iter().all(TermCredit::is_satisfied)
}
