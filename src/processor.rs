use std::collections::BTreeMap;

use crate::config::{EngineConfig, PartialAggregatePolicy, PromotionConfig};
use crate::grading;
use crate::models::{
    Category, GradedSubject, ProcessedStudent, StudentRecord, SubjectKind, SubjectStatistics,
};

pub const BEST_OF: usize = 6;

/// Grades every student against the cohort statistics, keeping roster order.
pub fn process_students(
    students: &[StudentRecord],
    stats: &BTreeMap<String, SubjectStatistics>,
    config: &EngineConfig,
) -> Vec<ProcessedStudent> {
    students
        .iter()
        .map(|student| process_student(student, stats, config))
        .collect()
}

pub fn process_student(
    student: &StudentRecord,
    stats: &BTreeMap<String, SubjectStatistics>,
    config: &EngineConfig,
) -> ProcessedStudent {
    let mut subjects = grade_subjects(student, stats, config);

    let core_points: Vec<u32> = subjects
        .iter()
        .filter(|s| s.kind == SubjectKind::Core)
        .map(|s| s.grade_point)
        .collect();
    let (best_six_aggregate, aggregate_complete) = best_six(
        &core_points,
        config.promotion.partial_aggregate,
        config.strategy.worst_core_grade_point(),
    );

    let graded = !core_points.is_empty();
    let category = categorize(best_six_aggregate, graded, &config.promotion);
    let exceptional = graded && best_six_aggregate <= config.promotion.exceptional_cutoff;
    let attendance_flagged = student.attendance < config.promotion.min_attendance;

    let overall_remark = student
        .final_remark
        .clone()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| derived_remark(category, graded).to_string());
    let recommendation = student
        .recommendation
        .clone()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| {
            derived_recommendation(
                category,
                exceptional,
                attendance_flagged,
                student.attendance,
                &config.promotion,
            )
        });

    // Aggregate selection above relies on subject-list order; display wants best score first.
    subjects.sort_by(|a, b| b.score.total_cmp(&a.score));

    ProcessedStudent {
        admission_id: student.admission_id.clone(),
        name: student.name.clone(),
        subjects,
        best_six_aggregate,
        aggregate_complete,
        category,
        exceptional,
        attendance: student.attendance,
        attendance_flagged,
        overall_remark,
        recommendation,
        promoted_to: student.promoted_to.clone(),
    }
}

fn grade_subjects(
    student: &StudentRecord,
    stats: &BTreeMap<String, SubjectStatistics>,
    config: &EngineConfig,
) -> Vec<GradedSubject> {
    config
        .subjects
        .iter()
        .filter_map(|subject| {
            let score = student.recorded_score(&subject.name)?;
            let empty;
            let subject_stats = match stats.get(&subject.name) {
                Some(found) => found,
                None => {
                    empty = SubjectStatistics::empty(&subject.name);
                    &empty
                }
            };
            let result = grading::classify(
                &config.strategy,
                &config.remarks,
                subject.kind,
                score,
                subject_stats,
            );
            Some(GradedSubject {
                subject: subject.name.clone(),
                kind: subject.kind,
                score,
                grade: result.symbol,
                remark: result.remark,
                color: result.color,
                facilitator: config.facilitator_for(&subject.name).to_string(),
                grade_point: result.grade_point,
            })
        })
        .collect()
}

/// Sum of the six lowest grade points, ties kept in input order.
///
/// Returns the aggregate and whether six points were available. A student with
/// no points always aggregates to 0.
pub fn best_six(points: &[u32], policy: PartialAggregatePolicy, worst_point: u32) -> (u32, bool) {
    let mut ranked: Vec<u32> = points.to_vec();
    ranked.sort();
    let taken: u32 = ranked.iter().take(BEST_OF).sum();
    let complete = points.len() >= BEST_OF;

    if complete || points.is_empty() {
        return (taken, complete);
    }
    match policy {
        PartialAggregatePolicy::SumAvailable => (taken, false),
        PartialAggregatePolicy::PadWithWorst => {
            let missing = (BEST_OF - points.len()) as u32;
            (taken + missing * worst_point, false)
        }
    }
}

/// Lower aggregate means a higher category.
pub fn categorize(aggregate: u32, graded: bool, promotion: &PromotionConfig) -> Category {
    if !graded {
        return Category::Fail;
    }
    if aggregate <= promotion.distinction_max {
        Category::Distinction
    } else if aggregate <= promotion.credit_max {
        Category::Credit
    } else if aggregate <= promotion.cutoff_value {
        Category::Pass
    } else {
        Category::Fail
    }
}

fn derived_remark(category: Category, graded: bool) -> &'static str {
    if !graded {
        return "No scores recorded for this term.";
    }
    match category {
        Category::Distinction => "Outstanding performance. Keep it up.",
        Category::Credit => "Very good performance. Aim even higher.",
        Category::Pass => "Fair performance. More effort is needed.",
        Category::Fail => "Weak performance. Needs serious improvement.",
    }
}

fn derived_recommendation(
    category: Category,
    exceptional: bool,
    attendance_flagged: bool,
    attendance: u32,
    promotion: &PromotionConfig,
) -> String {
    if attendance_flagged {
        return format!(
            "Attendance below minimum ({attendance} of {} required); refer for review before promotion.",
            promotion.min_attendance
        );
    }
    match category {
        Category::Fail => "Not recommended for promotion; remedial support advised.".to_string(),
        _ if exceptional => {
            format!("{category} with exceptional performance; recommended for promotion.")
        }
        _ => format!("{category}; recommended for promotion."),
    }
}
