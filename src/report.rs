use std::fmt::Write;

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::models::Category;
use crate::pipeline::PipelineOutput;

pub fn category_counts(output: &PipelineOutput) -> Vec<(Category, usize)> {
    [
        Category::Distinction,
        Category::Credit,
        Category::Pass,
        Category::Fail,
    ]
    .into_iter()
    .map(|category| {
        let count = output
            .students
            .iter()
            .filter(|s| s.category == category)
            .count();
        (category, count)
    })
    .collect()
}

pub fn build_report(
    class_label: Option<&str>,
    generated_on: NaiveDate,
    config: &EngineConfig,
    output: &PipelineOutput,
) -> String {
    let mut report = String::new();
    let class_label = class_label.unwrap_or(config.department.label());

    let _ = writeln!(report, "# Class Performance Report");
    let _ = writeln!(
        report,
        "Generated for {} ({}) on {}",
        class_label, config.department, generated_on
    );
    let _ = writeln!(report);
    let _ = writeln!(report, "## Class Summary");
    let _ = writeln!(report, "- Students: {}", output.students.len());
    let _ = writeln!(
        report,
        "- Average best-six aggregate: {:.1}",
        output.statistics.average_aggregate
    );
    for (category, count) in category_counts(output) {
        let _ = writeln!(report, "- {}: {}", category, count);
    }
    let flagged = output
        .students
        .iter()
        .filter(|s| s.attendance_flagged)
        .count();
    let _ = writeln!(report, "- Below minimum attendance: {}", flagged);

    let _ = writeln!(report);
    let _ = writeln!(report, "## Subject Statistics");
    let _ = writeln!(report, "| Subject | Scored | Mean | Std Dev |");
    let _ = writeln!(report, "|---|---|---|---|");
    for subject in &config.subjects {
        if let Some(stats) = output.statistics.subjects.get(&subject.name) {
            let _ = writeln!(
                report,
                "| {} | {} | {:.1} | {:.2} |",
                subject.name, stats.sample_size, stats.mean, stats.std_dev
            );
        }
    }

    let _ = writeln!(report);
    let _ = writeln!(report, "## Students");
    if output.students.is_empty() {
        let _ = writeln!(report, "No enrolled students.");
    } else {
        let _ = writeln!(
            report,
            "| # | Name | ID | Aggregate | Category | Attendance | Recommendation |"
        );
        let _ = writeln!(report, "|---|---|---|---|---|---|---|");
        for (idx, student) in output.students.iter().enumerate() {
            let aggregate = if student.aggregate_complete {
                student.best_six_aggregate.to_string()
            } else {
                format!("{}*", student.best_six_aggregate)
            };
            let _ = writeln!(
                report,
                "| {} | {} | {} | {} | {} | {} | {} |",
                idx + 1,
                student.name,
                student.admission_id,
                aggregate,
                student.category,
                student.attendance,
                student.recommendation
            );
        }
        if output.students.iter().any(|s| !s.aggregate_complete) {
            let _ = writeln!(report);
            let _ = writeln!(report, "\\* fewer than six graded core subjects");
        }
    }

    let _ = writeln!(report);
    let _ = writeln!(report, "## Facilitators");
    if output.facilitators.is_empty() {
        let _ = writeln!(report, "No graded subjects to attribute.");
    } else {
        for stats in output.facilitators.values() {
            let subjects: Vec<&str> = stats.subjects_taught.iter().map(String::as_str).collect();
            let _ = writeln!(
                report,
                "- {} ({}): {} students, avg score {:.1}, avg grade point {:.2}",
                stats.facilitator,
                subjects.join(", "),
                stats.student_count,
                stats.average_score,
                stats.average_grade_point
            );
        }
    }

    report
}
