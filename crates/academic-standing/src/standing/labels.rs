use serde::{Deserialize, Serialize};

/// Descriptive GPAX bucket shown next to a term summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeLabel {
    pub id: u8,
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl GradeLabel {
    fn new(id: u8, name: &str, min: f64, max: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            min,
            max,
        }
    }

    pub fn contains(&self, gpax: f64) -> bool {
        gpax >= self.min && gpax <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeLabelSet {
    labels: Vec<GradeLabel>,
}

impl GradeLabelSet {
    pub fn new(labels: Vec<GradeLabel>) -> Self {
        Self { labels }
    }

    /// Registrar buckets: honors, normal, probation, academic warning.
    pub fn standard() -> Self {
        Self::new(vec![
            GradeLabel::new(1, "Honors", 3.25, 4.0),
            GradeLabel::new(2, "Normal", 1.76, 3.24),
            GradeLabel::new(3, "Probation", 1.51, 1.75),
            GradeLabel::new(4, "Academic Warning", 0.0, 1.5),
        ])
    }

    /// The matching label with the highest lower bound.
    pub fn resolve(&self, gpax: f64) -> Option<&GradeLabel> {
        self.labels
            .iter()
            .filter(|label| label.contains(gpax))
            .max_by(|a, b| a.min.total_cmp(&b.min))
    }

    pub fn labels(&self) -> &[GradeLabel] {
        &self.labels
    }
}

impl Default for GradeLabelSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(set: &GradeLabelSet, gpax: f64) -> Option<&str> {
        set.resolve(gpax).map(|label| label.name.as_str())
    }

    #[test]
    fn standard_buckets_cover_boundaries() {
        let set = GradeLabelSet::standard();
        assert_eq!(name(&set, 4.0), Some("Honors"));
        assert_eq!(name(&set, 3.25), Some("Honors"));
        assert_eq!(name(&set, 3.24), Some("Normal"));
        assert_eq!(name(&set, 1.76), Some("Normal"));
        assert_eq!(name(&set, 1.75), Some("Probation"));
        assert_eq!(name(&set, 1.51), Some("Probation"));
        assert_eq!(name(&set, 1.5), Some("Academic Warning"));
        assert_eq!(name(&set, 0.0), Some("Academic Warning"));
        assert_eq!(name(&set, 4.5), None);
    }

    #[test]
    fn overlapping_ranges_prefer_highest_minimum() {
        let set = GradeLabelSet::new(vec![
            GradeLabel::new(1, "Good", 2.0, 3.0),
            GradeLabel::new(2, "Better", 3.0, 4.0),
        ]);
        assert_eq!(name(&set, 3.0), Some("Better"));
        assert_eq!(name(&set, 2.5), Some("Good"));
    }
}
