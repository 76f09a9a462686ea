use std::io::Write;

use groupscholar_grading_engine::config::{ConfigFile, Department, EngineConfig};
use groupscholar_grading_engine::models::{Category, StudentRecord};
use groupscholar_grading_engine::{compute_all, roster, ConfigError};

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const CONFIG: &str = r#"
department = "junior_high"

[subjects]
core = ["Mathematics", "English Language", "Integrated Science", "Social Studies", "Computing", "French", "Creative Arts and Design"]
disabled = ["Creative Arts and Design"]

[facilitators]
Mathematics = "Mr. Mensah"
"English Language" = "Mrs. Asante"
"Integrated Science" = "Mr. Mensah"

[promotion]
distinction_max = 12
credit_max = 24
cutoff_value = 36
min_attendance = 45
exceptional_cutoff = 10
"#;

const ROSTER: &str = "admission_id,name,attendance,subject,score
UBA-001,Ama Owusu,58,Mathematics,92
UBA-001,Ama Owusu,58,English Language,81
UBA-001,Ama Owusu,58,Integrated Science,88
UBA-001,Ama Owusu,58,Social Studies,79
UBA-001,Ama Owusu,58,Computing,90
UBA-001,Ama Owusu,58,French,85
UBA-002,Kofi Boateng,52,Mathematics,61
UBA-002,Kofi Boateng,52,English Language,64
UBA-002,Kofi Boateng,52,Integrated Science,58
UBA-002,Kofi Boateng,52,Social Studies,70
UBA-002,Kofi Boateng,52,Computing,66
UBA-002,Kofi Boateng,52,French,60
,Walk-in Applicant,0,Mathematics,99
UBA-003,Esi Mensah,31,Mathematics,40
UBA-003,Esi Mensah,31,English Language,47
UBA-003,Esi Mensah,31,Integrated Science,
UBA-004,Yaw Darko,60,,
";

#[test]
fn csv_roster_runs_through_the_whole_pipeline() {
    let config_file = write_temp(".toml", CONFIG);
    let roster_file = write_temp(".csv", ROSTER);

    let config = EngineConfig::load(config_file.path()).unwrap();
    assert_eq!(config.subjects.len(), 6);

    let students = roster::enrolled(roster::load_roster(roster_file.path()).unwrap());
    let ids: Vec<&str> = students.iter().map(|s| s.admission_id.as_str()).collect();
    assert_eq!(ids, vec!["UBA-001", "UBA-002", "UBA-003", "UBA-004"]);

    let output = compute_all(&students, &config);

    assert_eq!(output.statistics.subjects["Mathematics"].sample_size, 3);
    assert_eq!(output.statistics.subjects["Integrated Science"].sample_size, 2);
    assert!(!output.statistics.subjects.contains_key("Creative Arts and Design"));

    let ama = &output.students[0];
    assert_eq!(ama.subjects.len(), 6);
    assert!(ama.aggregate_complete);
    assert!(ama
        .subjects
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
    assert!(ama.best_six_aggregate <= output.students[1].best_six_aggregate);

    let esi = &output.students[2];
    assert_eq!(esi.subjects.len(), 2);
    assert!(!esi.aggregate_complete);
    assert!(esi.attendance_flagged);

    let yaw = &output.students[3];
    assert!(yaw.subjects.is_empty());
    assert_eq!(yaw.best_six_aggregate, 0);
    assert_eq!(yaw.category, Category::Fail);

    let mensah = &output.facilitators["Mr. Mensah"];
    assert_eq!(mensah.student_count, 3);
    assert_eq!(mensah.entry_count, 5);
    assert_eq!(
        output.facilitators["Unassigned"]
            .subjects_taught
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>(),
        vec!["Computing", "French", "Social Studies"]
    );
}

#[test]
fn json_roster_carries_edited_fields() {
    let json = r#"[
        {
            "admission_id": "UBA-010",
            "name": "Adwoa Sarpong",
            "attendance": 50,
            "scores": {"Numeracy": 82, "Language and Literacy": 45, "Self Care": 65},
            "promoted_to": "Kindergarten 1",
            "final_remark": "Curious and cheerful."
        }
    ]"#;
    let roster_file = write_temp(".json", json);
    let students = roster::load_roster(roster_file.path()).unwrap();

    let config = EngineConfig::default_for(Department::Nursery).unwrap();
    let output = compute_all(&students, &config);

    let adwoa = &output.students[0];
    assert_eq!(adwoa.overall_remark, "Curious and cheerful.");
    assert_eq!(adwoa.promoted_to.as_deref(), Some("Kindergarten 1"));

    let grades: Vec<(&str, &str)> = adwoa
        .subjects
        .iter()
        .map(|s| (s.subject.as_str(), s.grade.as_str()))
        .collect();
    assert_eq!(
        grades,
        vec![
            ("Numeracy", "A"),
            ("Self Care", "P"),
            ("Language and Literacy", "C"),
        ]
    );
    // A (1) + C (3); the indicator does not count.
    assert_eq!(adwoa.best_six_aggregate, 4);
}

#[test]
fn identical_inputs_give_identical_snapshots() {
    let config = EngineConfig::default_for(Department::JuniorHigh).unwrap();
    let roster: Vec<StudentRecord> = (0..12)
        .map(|i| {
            StudentRecord::new(format!("UBA-{i:03}"), format!("Student {i}"))
                .with_score("Mathematics", 35.0 + (i * 5) as f64)
                .with_score("English Language", 90.0 - (i * 3) as f64)
                .with_score("French", 50.0 + ((i * 7) % 11) as f64)
                .with_attendance(40 + i as u32)
        })
        .collect();

    let first = serde_json::to_vec(&compute_all(&roster, &config)).unwrap();
    let second = serde_json::to_vec(&compute_all(&roster, &config)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn malformed_scales_are_reported_at_load_time() {
    let mut file = ConfigFile::default_for(Department::Kindergarten);
    file.grading.early_childhood.core[1].max_score = 60;
    let err = EngineConfig::from_file(file).unwrap_err();
    assert!(matches!(err, ConfigError::RangeGap { .. }));

    let text = r#"
department = "upper_basic"

[[grading.norm]]
symbol = "A"
z_threshold = 0.5

[[grading.norm]]
symbol = "B"
z_threshold = 1.0
"#;
    let config_file = write_temp(".toml", text);
    let err = EngineConfig::load(config_file.path()).unwrap_err();
    let root = err.root_cause().to_string();
    assert!(root.contains("must be below"), "{root}");
}
