use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Facilitator name used when a subject has no mapped teacher.
pub const UNASSIGNED_FACILITATOR: &str = "Unassigned";

/// One enrolled student as supplied by the roster provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub admission_id: String,
    pub name: String,
    #[serde(default)]
    pub attendance: u32,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl StudentRecord {
    pub fn new(admission_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            admission_id: admission_id.into(),
            name: name.into(),
            attendance: 0,
            scores: BTreeMap::new(),
            promoted_to: None,
            final_remark: None,
            recommendation: None,
        }
    }

    pub fn with_score(mut self, subject: impl Into<String>, score: f64) -> Self {
        self.scores.insert(subject.into(), score);
        self
    }

    pub fn with_attendance(mut self, attendance: u32) -> Self {
        self.attendance = attendance;
        self
    }

    /// A student counts as enrolled once an admission id has been generated.
    pub fn is_enrolled(&self) -> bool {
        !self.admission_id.trim().is_empty()
    }

    /// The usable score for a subject: missing and non-finite values are
    /// absent, everything else is clamped to 0..=100.
    pub fn recorded_score(&self, subject: &str) -> Option<f64> {
        self.scores
            .get(subject)
            .copied()
            .filter(|score| score.is_finite())
            .map(|score| score.clamp(0.0, 100.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Core,
    Indicator,
}

/// A subject in the resolved active list for a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSubject {
    pub name: String,
    pub kind: SubjectKind,
}

impl ActiveSubject {
    pub fn core(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SubjectKind::Core,
        }
    }

    pub fn indicator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SubjectKind::Indicator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStatistics {
    pub subject: String,
    pub mean: f64,
    pub std_dev: f64,
    pub sample_size: usize,
}

impl SubjectStatistics {
    pub fn empty(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            mean: 0.0,
            std_dev: 0.0,
            sample_size: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStatistics {
    pub subjects: BTreeMap<String, SubjectStatistics>,
    pub average_aggregate: f64,
}

impl ClassStatistics {
    pub fn subject_mean(&self, subject: &str) -> Option<f64> {
        self.subjects.get(subject).map(|stats| stats.mean)
    }
}

/// Result of classifying a single score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub symbol: String,
    pub remark: String,
    pub color: Option<String>,
    pub grade_point: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedSubject {
    pub subject: String,
    pub kind: SubjectKind,
    pub score: f64,
    pub grade: String,
    pub remark: String,
    pub color: Option<String>,
    pub facilitator: String,
    pub grade_point: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Distinction,
    Credit,
    Pass,
    Fail,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Distinction => "Distinction",
            Category::Credit => "Credit",
            Category::Pass => "Pass",
            Category::Fail => "Fail",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedStudent {
    pub admission_id: String,
    pub name: String,
    /// Graded subjects, highest score first.
    pub subjects: Vec<GradedSubject>,
    pub best_six_aggregate: u32,
    /// False when fewer than six core subjects contributed to the aggregate.
    pub aggregate_complete: bool,
    pub category: Category,
    pub exceptional: bool,
    pub attendance: u32,
    pub attendance_flagged: bool,
    pub overall_remark: String,
    pub recommendation: String,
    pub promoted_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilitatorStats {
    pub facilitator: String,
    pub subjects_taught: BTreeSet<String>,
    pub student_count: usize,
    pub entry_count: usize,
    pub average_score: f64,
    pub average_grade_point: f64,
    pub grade_distribution: BTreeMap<String, usize>,
}
