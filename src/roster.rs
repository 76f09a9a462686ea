//! Roster loading.
//!
//! CSV rosters are in long form, one score per row:
//!
//! ```text
//! admission_id,name,attendance,subject,score
//! UBA-001,Ama Owusu,58,Mathematics,74
//! UBA-001,Ama Owusu,58,English Language,
//! ```
//!
//! Student fields are taken from the first row for each admission id. A blank
//! subject adds the student without a score; a blank score leaves the subject
//! unscored. JSON rosters are an array of [`StudentRecord`].

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use crate::models::StudentRecord;

#[derive(serde::Deserialize)]
struct CsvRow {
    admission_id: String,
    name: String,
    #[serde(default)]
    attendance: Option<u32>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    score: Option<String>,
    #[serde(default)]
    promoted_to: Option<String>,
}

pub fn load_roster(path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_json(path),
        _ => load_csv(path),
    }
}

pub fn load_json(path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse roster JSON: {}", path.display()))
}

pub fn load_csv(path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open roster: {}", path.display()))?;
    read_csv(reader)
}

pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> anyhow::Result<Vec<StudentRecord>> {
    let mut students: Vec<StudentRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid roster row {}", line + 1))?;

        let position = *index.entry(row.admission_id.clone()).or_insert_with(|| {
            let mut student = StudentRecord::new(row.admission_id.clone(), row.name.clone());
            student.attendance = row.attendance.unwrap_or(0);
            student.promoted_to = row.promoted_to.clone().filter(|p| !p.is_empty());
            students.push(student);
            students.len() - 1
        });
        let student = &mut students[position];

        let Some(subject) = row.subject.filter(|s| !s.is_empty()) else {
            continue;
        };
        let Some(raw) = row.score.filter(|s| !s.is_empty()) else {
            continue;
        };

        match raw.parse::<f64>() {
            Ok(score) if score.is_finite() => {
                if student.scores.insert(subject.clone(), score).is_some() {
                    tracing::warn!(
                        "duplicate score for {} in {subject}, keeping the later one",
                        student.admission_id
                    );
                }
            }
            _ => {
                tracing::warn!(
                    "treating unreadable score {raw:?} for {} in {subject} as missing",
                    student.admission_id
                );
            }
        }
    }

    Ok(students)
}

/// Students with a generated admission id, in roster order.
pub fn enrolled(students: Vec<StudentRecord>) -> Vec<StudentRecord> {
    students.into_iter().filter(StudentRecord::is_enrolled).collect()
}
