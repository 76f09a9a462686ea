//! Score classification.
//!
//! Standard departments grade on the cohort's z-score ladder; early-childhood
//! departments look scores up in fixed ranges, with a separate (usually
//! coarser) table for developmental indicators.

use std::collections::BTreeMap;

use crate::config::{CriterionScale, GradingStrategy, NormScale};
use crate::models::{Classification, SubjectKind, SubjectStatistics};

/// Position of `score` relative to the cohort, 0 when there is no spread.
pub fn z_score(score: f64, stats: &SubjectStatistics) -> f64 {
    if stats.std_dev > 0.0 {
        (score - stats.mean) / stats.std_dev
    } else {
        0.0
    }
}

/// Returns the symbol and its 1-based rank.
pub fn classify_norm<'a>(scale: &'a NormScale, z: f64) -> (&'a str, u32) {
    let grades = scale.grades();
    for (idx, grade) in grades.iter().enumerate() {
        match grade.z_threshold {
            Some(threshold) if threshold <= z => return (grade.symbol.as_str(), idx as u32 + 1),
            Some(_) => continue,
            None => return (grade.symbol.as_str(), idx as u32 + 1),
        }
    }
    let last = grades.len() - 1;
    (grades[last].symbol.as_str(), last as u32 + 1)
}

/// Returns the symbol, its color tag and its 1-based rank.
///
/// Fractional scores fall into the range whose lower bound they have reached.
pub fn classify_criterion(scale: &CriterionScale, score: f64) -> (&str, Option<&str>, u32) {
    let score = clamp_score(score);
    let ranges = scale.ranges();
    let (idx, range) = ranges
        .iter()
        .enumerate()
        .find(|(_, range)| f64::from(range.min_score) <= score)
        .unwrap_or((ranges.len() - 1, &ranges[ranges.len() - 1]));
    (range.symbol.as_str(), range.color.as_deref(), idx as u32 + 1)
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Remark for a symbol, falling back to the symbol itself.
pub fn remark_for(remarks: &BTreeMap<String, String>, symbol: &str) -> String {
    remarks
        .get(symbol)
        .cloned()
        .unwrap_or_else(|| symbol.to_string())
}

/// Classifies one (score, subject statistics) pair under the department's strategy.
pub fn classify(
    strategy: &GradingStrategy,
    remarks: &BTreeMap<String, String>,
    kind: SubjectKind,
    score: f64,
    stats: &SubjectStatistics,
) -> Classification {
    let score = clamp_score(score);
    let (symbol, color, grade_point) = match strategy {
        GradingStrategy::NormReferenced(scale) => {
            let (symbol, point) = classify_norm(scale, z_score(score, stats));
            (symbol, None, point)
        }
        GradingStrategy::CriterionReferenced { core, indicators } => {
            let scale = match kind {
                SubjectKind::Core => core,
                SubjectKind::Indicator => indicators,
            };
            classify_criterion(scale, score)
        }
    };

    Classification {
        symbol: symbol.to_string(),
        remark: remark_for(remarks, symbol),
        color: color.map(str::to_string),
        grade_point,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_remarks;
    use crate::statistics::summarize;

    fn stats(mean: f64, std_dev: f64) -> SubjectStatistics {
        SubjectStatistics {
            subject: "Mathematics".to_string(),
            mean,
            std_dev,
            sample_size: 2,
        }
    }

    #[test]
    fn two_student_scenario_lands_on_b3_and_c6() {
        let cohort = summarize("Mathematics", &[90.0, 50.0]);
        assert_eq!(cohort.mean, 70.0);
        assert_eq!(cohort.std_dev, 20.0);

        let strategy = GradingStrategy::NormReferenced(NormScale::standard());
        let remarks = default_remarks();

        let top = classify(&strategy, &remarks, SubjectKind::Core, 90.0, &cohort);
        assert_eq!(top.symbol, "B3");
        assert_eq!(top.grade_point, 3);
        assert_eq!(top.remark, "Good");

        let bottom = classify(&strategy, &remarks, SubjectKind::Core, 50.0, &cohort);
        assert_eq!(bottom.symbol, "C6");
        assert_eq!(bottom.grade_point, 6);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let scale = NormScale::standard();
        assert_eq!(classify_norm(&scale, 1.645), ("A1", 1));
        assert_eq!(classify_norm(&scale, 0.0), ("C4", 4));
        assert_eq!(classify_norm(&scale, -2.326), ("E8", 8));
        assert_eq!(classify_norm(&scale, -2.33), ("F9", 9));
        assert_eq!(classify_norm(&scale, -40.0), ("F9", 9));
    }

    #[test]
    fn zero_spread_gives_the_at_mean_grade() {
        let strategy = GradingStrategy::NormReferenced(NormScale::standard());
        let flat = stats(64.0, 0.0);
        let remarks = BTreeMap::new();
        for score in [0.0, 64.0, 100.0] {
            let result = classify(&strategy, &remarks, SubjectKind::Core, score, &flat);
            assert_eq!(result.symbol, "C4");
        }
    }

    #[test]
    fn lower_scores_never_get_better_grades() {
        let scale = NormScale::standard();
        let cohort = stats(58.0, 13.5);
        let mut previous = 0;
        for score in (0..=100).rev() {
            let (_, point) = classify_norm(&scale, z_score(score as f64, &cohort));
            assert!(point >= previous, "score {score} improved the grade");
            previous = point;
        }
    }

    #[test]
    fn ladder_without_catch_all_uses_last_grade() {
        let scale = NormScale::new(vec![
            crate::config::NormGrade::new("Pass", Some(0.0)),
            crate::config::NormGrade::new("Fail", Some(-1.0)),
        ])
        .unwrap();
        assert_eq!(classify_norm(&scale, -3.0), ("Fail", 2));
    }

    #[test]
    fn every_score_matches_exactly_one_range() {
        let scale = CriterionScale::early_childhood_core();
        for tenth in 0..=1000 {
            let score = tenth as f64 / 10.0;
            let matching = scale
                .ranges()
                .iter()
                .filter(|r| {
                    f64::from(r.min_score) <= score && score < f64::from(r.max_score) + 1.0
                })
                .count();
            assert_eq!(matching, 1, "score {score}");
            let (symbol, _, _) = classify_criterion(&scale, score);
            assert!(["A", "B", "C"].contains(&symbol));
        }
    }

    #[test]
    fn criterion_lookup_clamps_out_of_range_scores() {
        let scale = CriterionScale::early_childhood_core();
        assert_eq!(classify_criterion(&scale, 140.0), ("A", Some("green"), 1));
        assert_eq!(classify_criterion(&scale, -5.0), ("C", Some("red"), 3));
        assert_eq!(classify_criterion(&scale, 74.9), ("B", Some("blue"), 2));
    }

    #[test]
    fn indicators_use_their_own_scale() {
        let strategy = GradingStrategy::CriterionReferenced {
            core: CriterionScale::early_childhood_core(),
            indicators: CriterionScale::developmental_indicators(),
        };
        let remarks = default_remarks();
        let unused = SubjectStatistics::empty("Self Care");

        let core = classify(&strategy, &remarks, SubjectKind::Core, 72.0, &unused);
        let indicator = classify(&strategy, &remarks, SubjectKind::Indicator, 72.0, &unused);
        assert_eq!(core.symbol, "B");
        assert_eq!(indicator.symbol, "D");
        assert_eq!(indicator.remark, "Developed");
        assert_eq!(indicator.color.as_deref(), Some("green"));
    }

    #[test]
    fn missing_remark_falls_back_to_symbol() {
        let remarks = BTreeMap::new();
        assert_eq!(remark_for(&remarks, "B2"), "B2");
    }
}
