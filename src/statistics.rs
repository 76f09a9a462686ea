use std::collections::BTreeMap;

use crate::models::{ActiveSubject, StudentRecord, SubjectStatistics};

/// Mean and population standard deviation for every active subject.
///
/// Students without a recorded score are left out of that subject's sample.
/// A subject nobody was scored in gets `mean = 0, std_dev = 0, sample_size = 0`.
pub fn calculate_subject_statistics(
    students: &[StudentRecord],
    subjects: &[ActiveSubject],
) -> BTreeMap<String, SubjectStatistics> {
    subjects
        .iter()
        .map(|subject| {
            let scores: Vec<f64> = students
                .iter()
                .filter_map(|student| student.recorded_score(&subject.name))
                .collect();
            (subject.name.clone(), summarize(&subject.name, &scores))
        })
        .collect()
}

pub fn summarize(subject: &str, scores: &[f64]) -> SubjectStatistics {
    if scores.is_empty() {
        return SubjectStatistics::empty(subject);
    }

    // Identical scores have no spread; summing them can still drift the mean by an ulp.
    if scores.iter().all(|s| *s == scores[0]) {
        return SubjectStatistics {
            subject: subject.to_string(),
            mean: scores[0],
            std_dev: 0.0,
            sample_size: scores.len(),
        };
    }

    let count = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / count;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count;
    let std_dev = variance.sqrt();

    SubjectStatistics {
        subject: subject.to_string(),
        mean,
        std_dev,
        sample_size: scores.len(),
    }
}

/// Average best-six aggregate across the cohort, 0 for an empty cohort.
pub fn average_aggregate(aggregates: impl IntoIterator<Item = u32>) -> f64 {
    let (count, total) = aggregates
        .into_iter()
        .fold((0usize, 0u64), |(count, total), agg| (count + 1, total + agg as u64));
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_standard_deviation() {
        let stats = summarize("Mathematics", &[60.0, 70.0, 80.0]);
        assert!((stats.mean - 70.0).abs() < 1e-9);
        assert!((stats.std_dev - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((stats.std_dev - 8.165).abs() < 0.001);
        assert_eq!(stats.sample_size, 3);
    }

    #[test]
    fn missing_scores_are_not_zeroes() {
        let students = vec![
            StudentRecord::new("1", "Ama").with_score("Science", 80.0),
            StudentRecord::new("2", "Kojo"),
            StudentRecord::new("3", "Esi").with_score("Science", 60.0),
        ];
        let subjects = vec![ActiveSubject::core("Science"), ActiveSubject::core("French")];

        let stats = calculate_subject_statistics(&students, &subjects);
        assert_eq!(stats["Science"].sample_size, 2);
        assert!((stats["Science"].mean - 70.0).abs() < 1e-9);
        assert_eq!(stats["French"], SubjectStatistics::empty("French"));
    }

    #[test]
    fn single_score_has_no_spread() {
        let stats = summarize("Computing", &[55.0]);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.mean, 55.0);
    }

    #[test]
    fn identical_fractional_scores_have_no_spread() {
        let ten = summarize("Mathematics", &[60.1; 10]);
        assert_eq!(ten.mean, 60.1);
        assert_eq!(ten.std_dev, 0.0);

        let three = summarize("Mathematics", &[0.1, 0.1, 0.1]);
        assert_eq!(three.mean, 0.1);
        assert_eq!(three.std_dev, 0.0);
    }

    #[test]
    fn order_of_students_does_not_matter() {
        let forward = summarize("English", &[45.0, 72.5, 88.0, 61.0]);
        let reversed = summarize("English", &[61.0, 88.0, 72.5, 45.0]);
        assert!((forward.mean - reversed.mean).abs() < 1e-12);
        assert!((forward.std_dev - reversed.std_dev).abs() < 1e-12);
    }

    #[test]
    fn average_aggregate_handles_empty_cohort() {
        assert_eq!(average_aggregate(Vec::new()), 0.0);
        assert_eq!(average_aggregate(vec![10, 20, 33]), 21.0);
    }
}
