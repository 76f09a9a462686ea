//! Academic grading and statistics engine.
//!
//! Turns a roster of raw per-subject scores into cohort statistics, letter
//! grades, best-six aggregates, performance categories and facilitator
//! roll-ups. Everything under [`pipeline`] is pure; [`roster`] and
//! [`report`] are the file-facing adapters used by the CLI.

pub mod config;
pub mod error;
pub mod facilitator;
pub mod grading;
pub mod models;
pub mod pipeline;
pub mod processor;
pub mod report;
pub mod roster;
pub mod statistics;

pub use config::{Department, EngineConfig};
pub use error::ConfigError;
pub use pipeline::{compute_all, PipelineOutput};
