//! Grading configuration: departments, subject lists, grading scales and
//! promotion thresholds.
//!
//! Configuration arrives as a TOML file (see [`ConfigFile`]) and is validated
//! once by [`EngineConfig::from_file`]. Scales are only constructible through
//! their validating constructors, so the pipeline never re-checks them.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::ActiveSubject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Daycare,
    Nursery,
    #[value(alias = "kg")]
    Kindergarten,
    #[value(alias = "lower_basic")]
    LowerBasic,
    #[value(alias = "upper_basic")]
    UpperBasic,
    #[value(alias = "junior_high", alias = "jhs")]
    JuniorHigh,
}

impl Department {
    pub fn is_early_childhood(&self) -> bool {
        matches!(
            self,
            Department::Daycare | Department::Nursery | Department::Kindergarten
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Department::Daycare => "Daycare",
            Department::Nursery => "Nursery",
            Department::Kindergarten => "Kindergarten",
            Department::LowerBasic => "Lower Basic School",
            Department::UpperBasic => "Upper Basic School",
            Department::JuniorHigh => "Junior High School",
        }
    }

    pub fn default_core_subjects(&self) -> Vec<String> {
        let subjects: &[&str] = match self {
            Department::Daycare | Department::Nursery => &[
                "Language and Literacy",
                "Numeracy",
                "Our World Our People",
                "Creative Activities",
            ],
            Department::Kindergarten => &[
                "Language and Literacy",
                "Numeracy",
                "Our World Our People",
                "Creative Arts",
                "Physical Development",
            ],
            Department::LowerBasic | Department::UpperBasic => &[
                "English Language",
                "Mathematics",
                "Science",
                "Our World Our People",
                "Religious and Moral Education",
                "Computing",
                "Creative Arts",
                "Ghanaian Language",
            ],
            Department::JuniorHigh => &[
                "English Language",
                "Mathematics",
                "Integrated Science",
                "Social Studies",
                "Religious and Moral Education",
                "Computing",
                "Career Technology",
                "Creative Arts and Design",
                "Ghanaian Language",
                "French",
            ],
        };
        subjects.iter().map(|s| s.to_string()).collect()
    }

    pub fn default_indicators(&self) -> Vec<String> {
        if !self.is_early_childhood() {
            return Vec::new();
        }
        [
            "Fine Motor Skills",
            "Gross Motor Skills",
            "Listening and Attention",
            "Social Interaction",
            "Self Care",
            "Following Instructions",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One rung of the norm-referenced ladder. A grade without a threshold is the
/// catch-all and may only appear last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormGrade {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_threshold: Option<f64>,
}

impl NormGrade {
    pub fn new(symbol: impl Into<String>, z_threshold: Option<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            z_threshold,
        }
    }
}

/// Validated z-score ladder, best grade first.
#[derive(Debug, Clone, PartialEq)]
pub struct NormScale {
    grades: Vec<NormGrade>,
}

impl NormScale {
    pub fn new(grades: Vec<NormGrade>) -> Result<Self, ConfigError> {
        if grades.is_empty() {
            return Err(ConfigError::EmptyScale { scale: "norm" });
        }
        check_unique("norm", grades.iter().map(|g| g.symbol.as_str()))?;

        let last = grades.len() - 1;
        let mut previous: Option<f64> = None;
        for (idx, grade) in grades.iter().enumerate() {
            match grade.z_threshold {
                None if idx != last => {
                    return Err(ConfigError::MisplacedCatchAll {
                        symbol: grade.symbol.clone(),
                    })
                }
                None => {}
                Some(threshold) => {
                    if !threshold.is_finite() {
                        return Err(ConfigError::NonFiniteThreshold {
                            symbol: grade.symbol.clone(),
                        });
                    }
                    if let Some(prev) = previous {
                        if threshold >= prev {
                            return Err(ConfigError::ThresholdsNotDescending {
                                symbol: grade.symbol.clone(),
                                threshold,
                                previous: prev,
                            });
                        }
                    }
                    previous = Some(threshold);
                }
            }
        }

        Ok(Self { grades })
    }

    /// The standard nine-step ladder, A1 at +1.645σ down to F9.
    pub fn standard() -> Self {
        Self {
            grades: vec![
                NormGrade::new("A1", Some(1.645)),
                NormGrade::new("B2", Some(1.036)),
                NormGrade::new("B3", Some(0.524)),
                NormGrade::new("C4", Some(0.0)),
                NormGrade::new("C5", Some(-0.524)),
                NormGrade::new("C6", Some(-1.036)),
                NormGrade::new("D7", Some(-1.645)),
                NormGrade::new("E8", Some(-2.326)),
                NormGrade::new("F9", None),
            ],
        }
    }

    pub fn grades(&self) -> &[NormGrade] {
        &self.grades
    }

    pub fn worst_grade_point(&self) -> u32 {
        self.grades.len() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriterionRange {
    pub symbol: String,
    pub min_score: u32,
    pub max_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CriterionRange {
    pub fn new(symbol: impl Into<String>, min_score: u32, max_score: u32, color: &str) -> Self {
        Self {
            symbol: symbol.into(),
            min_score,
            max_score,
            color: Some(color.to_string()),
        }
    }
}

/// Validated fixed score-range table covering 0..=100, highest range first.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionScale {
    ranges: Vec<CriterionRange>,
}

impl CriterionScale {
    pub fn new(scale: &'static str, mut ranges: Vec<CriterionRange>) -> Result<Self, ConfigError> {
        if ranges.is_empty() {
            return Err(ConfigError::EmptyScale { scale });
        }
        check_unique(scale, ranges.iter().map(|r| r.symbol.as_str()))?;

        for range in &ranges {
            if range.min_score > range.max_score {
                return Err(ConfigError::InvertedRange {
                    scale,
                    symbol: range.symbol.clone(),
                    min: range.min_score,
                    max: range.max_score,
                });
            }
        }

        ranges.sort_by_key(|r| r.min_score);

        if ranges[0].min_score != 0 {
            return Err(ConfigError::RangesDoNotStartAtZero {
                scale,
                min: ranges[0].min_score,
            });
        }
        for pair in ranges.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if upper.min_score <= lower.max_score {
                return Err(ConfigError::RangeOverlap {
                    scale,
                    first: lower.symbol.clone(),
                    second: upper.symbol.clone(),
                });
            }
            if upper.min_score != lower.max_score + 1 {
                return Err(ConfigError::RangeGap {
                    scale,
                    after: lower.max_score,
                    before: upper.min_score,
                });
            }
        }
        let top = ranges[ranges.len() - 1].max_score;
        if top != 100 {
            return Err(ConfigError::RangesDoNotReachHundred { scale, max: top });
        }

        ranges.reverse();
        Ok(Self { ranges })
    }

    pub fn early_childhood_core() -> Self {
        Self {
            ranges: vec![
                CriterionRange::new("A", 75, 100, "green"),
                CriterionRange::new("B", 50, 74, "blue"),
                CriterionRange::new("C", 0, 49, "red"),
            ],
        }
    }

    pub fn developmental_indicators() -> Self {
        Self {
            ranges: vec![
                CriterionRange::new("D", 70, 100, "green"),
                CriterionRange::new("P", 40, 69, "amber"),
                CriterionRange::new("E", 0, 39, "red"),
            ],
        }
    }

    /// Ranges ordered best first.
    pub fn ranges(&self) -> &[CriterionRange] {
        &self.ranges
    }

    pub fn worst_grade_point(&self) -> u32 {
        self.ranges.len() as u32
    }
}

fn check_unique<'a>(
    scale: &'static str,
    symbols: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for symbol in symbols {
        if !seen.insert(symbol) {
            return Err(ConfigError::DuplicateSymbol {
                scale,
                symbol: symbol.to_string(),
            });
        }
    }
    Ok(())
}

/// Grading strategy selected once per department.
#[derive(Debug, Clone, PartialEq)]
pub enum GradingStrategy {
    NormReferenced(NormScale),
    CriterionReferenced {
        core: CriterionScale,
        indicators: CriterionScale,
    },
}

impl GradingStrategy {
    pub fn symbols(&self) -> Vec<&str> {
        match self {
            GradingStrategy::NormReferenced(scale) => {
                scale.grades().iter().map(|g| g.symbol.as_str()).collect()
            }
            GradingStrategy::CriterionReferenced { core, indicators } => core
                .ranges()
                .iter()
                .chain(indicators.ranges())
                .map(|r| r.symbol.as_str())
                .collect(),
        }
    }

    /// Worst grade point of the scale used for core subjects.
    pub fn worst_core_grade_point(&self) -> u32 {
        match self {
            GradingStrategy::NormReferenced(scale) => scale.worst_grade_point(),
            GradingStrategy::CriterionReferenced { core, .. } => core.worst_grade_point(),
        }
    }
}

/// How the best-six aggregate treats students with fewer than six core subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialAggregatePolicy {
    /// Sum whatever is available.
    #[default]
    SumAvailable,
    /// Fill missing slots with the worst grade point of the scale.
    PadWithWorst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PromotionConfig {
    pub distinction_max: u32,
    pub credit_max: u32,
    pub cutoff_value: u32,
    pub min_attendance: u32,
    pub exceptional_cutoff: u32,
    pub partial_aggregate: PartialAggregatePolicy,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            distinction_max: 12,
            credit_max: 24,
            cutoff_value: 36,
            min_attendance: 45,
            exceptional_cutoff: 10,
            partial_aggregate: PartialAggregatePolicy::SumAvailable,
        }
    }
}

impl PromotionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.distinction_max > self.credit_max {
            return Err(ConfigError::BandsOutOfOrder {
                name: "distinction_max",
                value: self.distinction_max,
                limit_name: "credit_max",
                limit: self.credit_max,
            });
        }
        if self.credit_max > self.cutoff_value {
            return Err(ConfigError::BandsOutOfOrder {
                name: "credit_max",
                value: self.credit_max,
                limit_name: "cutoff_value",
                limit: self.cutoff_value,
            });
        }
        Ok(())
    }
}

/// Subject list inputs for a class.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SubjectCatalog {
    pub core: Vec<String>,
    pub custom: Vec<String>,
    pub disabled: Vec<String>,
    /// Left out, the department's default indicators apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<Vec<String>>,
}

impl SubjectCatalog {
    pub fn for_department(department: Department) -> Self {
        Self {
            core: department.default_core_subjects(),
            custom: Vec::new(),
            disabled: Vec::new(),
            indicators: Some(department.default_indicators()),
        }
    }

    /// Core and custom subjects without duplicates or disabled entries, then
    /// developmental indicators for early-childhood departments.
    pub fn active_subjects(&self, department: Department) -> Vec<ActiveSubject> {
        let disabled: HashSet<&str> = self.disabled.iter().map(String::as_str).collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut active: Vec<ActiveSubject> = self
            .core
            .iter()
            .chain(&self.custom)
            .filter(|s| seen.insert(s.to_string()))
            .filter(|s| !disabled.contains(s.as_str()))
            .map(ActiveSubject::core)
            .collect();

        if department.is_early_childhood() {
            let defaults;
            let names = match &self.indicators {
                Some(names) => names,
                None => {
                    defaults = department.default_indicators();
                    &defaults
                }
            };
            let indicators: Vec<ActiveSubject> = names
                .iter()
                .filter(|s| seen.insert(s.to_string()))
                .map(ActiveSubject::indicator)
                .collect();
            active.extend(indicators);
        }

        active
    }
}

pub fn default_remarks() -> BTreeMap<String, String> {
    [
        ("A1", "Excellent"),
        ("B2", "Very Good"),
        ("B3", "Good"),
        ("C4", "Credit"),
        ("C5", "Credit"),
        ("C6", "Credit"),
        ("D7", "Pass"),
        ("E8", "Pass"),
        ("F9", "Fail"),
        ("A", "Exceeds Expectation"),
        ("B", "Meets Expectation"),
        ("C", "Approaching Expectation"),
        ("D", "Developed"),
        ("P", "Progressing"),
        ("E", "Emerging"),
    ]
    .into_iter()
    .map(|(symbol, remark)| (symbol.to_string(), remark.to_string()))
    .collect()
}

/// On-disk configuration. Every table rejects unknown keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub department: Department,
    #[serde(default)]
    pub subjects: Option<SubjectCatalog>,
    #[serde(default)]
    pub grading: GradingSection,
    #[serde(default)]
    pub facilitators: BTreeMap<String, String>,
    #[serde(default)]
    pub promotion: PromotionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GradingSection {
    /// Omitted remarks fall back to the built-in table for the configured symbols.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<BTreeMap<String, String>>,
    pub norm: Vec<NormGrade>,
    pub early_childhood: EarlyChildhoodSection,
}

impl Default for GradingSection {
    fn default() -> Self {
        Self {
            remarks: None,
            norm: NormScale::standard().grades,
            early_childhood: EarlyChildhoodSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EarlyChildhoodSection {
    pub core: Vec<CriterionRange>,
    pub indicators: Vec<CriterionRange>,
}

impl Default for EarlyChildhoodSection {
    fn default() -> Self {
        Self {
            core: CriterionScale::early_childhood_core().ranges,
            indicators: CriterionScale::developmental_indicators().ranges,
        }
    }
}

impl ConfigFile {
    pub fn default_for(department: Department) -> Self {
        Self {
            department,
            subjects: Some(SubjectCatalog::for_department(department)),
            grading: GradingSection {
                remarks: Some(default_remarks()),
                ..GradingSection::default()
            },
            facilitators: BTreeMap::new(),
            promotion: PromotionConfig::default(),
        }
    }
}

/// Validated configuration consumed by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub department: Department,
    pub subjects: Vec<ActiveSubject>,
    pub strategy: GradingStrategy,
    pub remarks: BTreeMap<String, String>,
    pub facilitators: BTreeMap<String, String>,
    pub promotion: PromotionConfig,
}

impl EngineConfig {
    pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let department = file.department;

        let norm = NormScale::new(file.grading.norm)?;
        let core = CriterionScale::new("early childhood core", file.grading.early_childhood.core)?;
        let indicators = CriterionScale::new(
            "developmental indicator",
            file.grading.early_childhood.indicators,
        )?;

        let known: HashSet<&str> = norm
            .grades()
            .iter()
            .map(|g| g.symbol.as_str())
            .chain(core.ranges().iter().map(|r| r.symbol.as_str()))
            .chain(indicators.ranges().iter().map(|r| r.symbol.as_str()))
            .collect();
        let remarks = match file.grading.remarks {
            Some(remarks) => {
                if let Some(symbol) = remarks.keys().find(|symbol| !known.contains(symbol.as_str())) {
                    return Err(ConfigError::UnknownRemarkSymbol {
                        symbol: symbol.clone(),
                    });
                }
                remarks
            }
            None => default_remarks()
                .into_iter()
                .filter(|(symbol, _)| known.contains(symbol.as_str()))
                .collect(),
        };

        file.promotion.validate()?;

        let catalog = file
            .subjects
            .unwrap_or_else(|| SubjectCatalog::for_department(department));
        let subjects = catalog.active_subjects(department);
        if subjects.is_empty() {
            return Err(ConfigError::NoActiveSubjects {
                department: department.to_string(),
            });
        }

        let active: HashSet<&str> = subjects.iter().map(|s| s.name.as_str()).collect();
        let mut facilitators = BTreeMap::new();
        for (subject, facilitator) in file.facilitators {
            if !active.contains(subject.as_str()) {
                tracing::warn!("dropping facilitator mapping for inactive subject {subject}");
                continue;
            }
            let facilitator = facilitator.trim().to_string();
            if facilitator.is_empty() {
                continue;
            }
            facilitators.insert(subject, facilitator);
        }

        let strategy = if department.is_early_childhood() {
            GradingStrategy::CriterionReferenced { core, indicators }
        } else {
            GradingStrategy::NormReferenced(norm)
        };

        Ok(Self {
            department,
            subjects,
            strategy,
            remarks,
            facilitators,
            promotion: file.promotion,
        })
    }

    pub fn default_for(department: Department) -> Result<Self, ConfigError> {
        Self::from_file(ConfigFile::default_for(department))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("failed to parse grading config")?;
        Ok(Self::from_file(file)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn with_facilitator(mut self, subject: impl Into<String>, facilitator: impl Into<String>) -> Self {
        self.facilitators.insert(subject.into(), facilitator.into());
        self
    }

    pub fn facilitator_for(&self, subject: &str) -> &str {
        self.facilitators
            .get(subject)
            .map(String::as_str)
            .unwrap_or(crate::models::UNASSIGNED_FACILITATOR)
    }
}
