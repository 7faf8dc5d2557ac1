use super::domain::{Cutoff, StudentPlanEntry};

/// Whether a plan entry scheduled at `planned` falls inside the window judged at `cutoff`.
///
/// Entries of earlier study years are always inside. Within the cutoff year the term
/// ordinal decides, which makes a summer cutoff cover both regular terms of that year as
/// well as summer itself: summer is the last chance to clear the year.
pub fn is_within_window(planned: Cutoff, cutoff: Cutoff) -> bool {
    planned.year < cutoff.year
        || (planned.year == cutoff.year && planned.term.ordinal() <= cutoff.term.ordinal())
}

/// Required courses inside the window that have not been passed yet.
pub fn outstanding_entries(
    entries: &[StudentPlanEntry],
    cutoff: Cutoff,
) -> impl Iterator<Item = &StudentPlanEntry> {
    entries
        .iter()
        .filter(move |entry| !entry.is_pass && is_within_window(entry.planned(), cutoff))
}

/// A student follows the plan when nothing due by `cutoff` is still unpassed.
/// An empty window is trivially conformant.
pub fn is_following_plan(entries: &[StudentPlanEntry], cutoff: Cutoff) -> bool {
    outstanding_entries(entries, cutoff).next().is_none()
}
