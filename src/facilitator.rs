use std::collections::{BTreeMap, BTreeSet};

use crate::models::{FacilitatorStats, ProcessedStudent};

#[derive(Default)]
struct Accumulator {
    subjects: BTreeSet<String>,
    students: BTreeSet<usize>,
    entries: usize,
    score_total: f64,
    point_total: u64,
    distribution: BTreeMap<String, usize>,
}

/// Rolls graded subjects up by facilitator.
///
/// Students are counted once per facilitator however many of that
/// facilitator's subjects they took; averages are taken over graded entries.
/// Facilitators without any graded entry do not appear.
pub fn calculate_facilitator_stats(
    students: &[ProcessedStudent],
) -> BTreeMap<String, FacilitatorStats> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for (idx, student) in students.iter().enumerate() {
        for subject in &student.subjects {
            let entry = groups.entry(subject.facilitator.as_str()).or_default();
            entry.subjects.insert(subject.subject.clone());
            entry.students.insert(idx);
            entry.entries += 1;
            entry.score_total += subject.score;
            entry.point_total += subject.grade_point as u64;
            *entry.distribution.entry(subject.grade.clone()).or_insert(0) += 1;
        }
    }

    groups
        .into_iter()
        .map(|(facilitator, acc)| {
            let count = acc.entries as f64;
            let stats = FacilitatorStats {
                facilitator: facilitator.to_string(),
                subjects_taught: acc.subjects,
                student_count: acc.students.len(),
                entry_count: acc.entries,
                average_score: acc.score_total / count,
                average_grade_point: acc.point_total as f64 / count,
                grade_distribution: acc.distribution,
            };
            (facilitator.to_string(), stats)
        })
        .collect()
}
