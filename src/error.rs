//! Configuration error types.
//!
//! Grading configuration is validated once when it is loaded. The pipeline
//! only ever sees a validated [`crate::config::EngineConfig`], so these are the
//! only errors the engine surfaces.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{scale} scale has no grades")]
    EmptyScale { scale: &'static str },

    #[error("{scale} scale lists symbol {symbol} more than once")]
    DuplicateSymbol { scale: &'static str, symbol: String },

    #[error("z threshold for {symbol} must be finite")]
    NonFiniteThreshold { symbol: String },

    #[error("z threshold for {symbol} ({threshold}) must be below the grade above it ({previous})")]
    ThresholdsNotDescending {
        symbol: String,
        threshold: f64,
        previous: f64,
    },

    #[error("only the last grade may omit a z threshold, but {symbol} has none")]
    MisplacedCatchAll { symbol: String },

    #[error("{scale} range for {symbol} is inverted ({min}..={max})")]
    InvertedRange {
        scale: &'static str,
        symbol: String,
        min: u32,
        max: u32,
    },

    #[error("{scale} ranges must start at 0, lowest range starts at {min}")]
    RangesDoNotStartAtZero { scale: &'static str, min: u32 },

    #[error("{scale} ranges must end at 100, highest range ends at {max}")]
    RangesDoNotReachHundred { scale: &'static str, max: u32 },

    #[error("{scale} ranges leave a gap between {after} and {before}")]
    RangeGap {
        scale: &'static str,
        after: u32,
        before: u32,
    },

    #[error("{scale} ranges {first} and {second} overlap")]
    RangeOverlap {
        scale: &'static str,
        first: String,
        second: String,
    },

    #[error("remark given for {symbol}, which is not a grade in any configured scale")]
    UnknownRemarkSymbol { symbol: String },

    #[error("promotion band {name} ({value}) must not exceed {limit_name} ({limit})")]
    BandsOutOfOrder {
        name: &'static str,
        value: u32,
        limit_name: &'static str,
        limit: u32,
    },

    #[error("no active subjects remain for {department}")]
    NoActiveSubjects { department: String },
}
