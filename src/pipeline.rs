//! The full grading pass: statistics, classification, per-student processing
//! and facilitator roll-up, in that order.
//!
//! [`compute_all`] is deterministic and does no I/O. Callers that want to skip
//! recomputation can compare the roster and config they last ran with, both of
//! which implement `PartialEq`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::facilitator::calculate_facilitator_stats;
use crate::models::{ClassStatistics, FacilitatorStats, ProcessedStudent, StudentRecord};
use crate::processor::process_students;
use crate::statistics::{average_aggregate, calculate_subject_statistics};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub statistics: ClassStatistics,
    pub students: Vec<ProcessedStudent>,
    pub facilitators: BTreeMap<String, FacilitatorStats>,
}

/// Runs every stage over an already-filtered roster of enrolled students.
pub fn compute_all(roster: &[StudentRecord], config: &EngineConfig) -> PipelineOutput {
    let subjects = calculate_subject_statistics(roster, &config.subjects);
    tracing::debug!(
        "computed statistics for {} subjects over {} students",
        subjects.len(),
        roster.len()
    );

    let students = process_students(roster, &subjects, config);
    let statistics = ClassStatistics {
        subjects,
        average_aggregate: average_aggregate(students.iter().map(|s| s.best_six_aggregate)),
    };

    let facilitators = calculate_facilitator_stats(&students);
    tracing::debug!(
        "processed {} students, {} facilitators, class average aggregate {:.2}",
        students.len(),
        facilitators.len(),
        statistics.average_aggregate
    );

    PipelineOutput {
        statistics,
        students,
        facilitators,
    }
}
