//! # taskrank Core Library
//!
//! This library ranks a free-form list of tasks. Every task gets a 0-100
//! score, a High/Medium/Low label and a short rationale, and a batch can be
//! grouped into an Eisenhower urgency/importance matrix. The `taskrank` CLI
//! is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Scoring**: a language-model scorer and a deterministic offline
//!   heuristic behind the [`TaskScorer`] trait
//! - **Pipeline**: [`Prioritizer`] scores, normalizes, sorts and labels a
//!   batch, falling back to the heuristic whenever the model is unavailable
//! - **Matrix**: [`build_matrix`] splits a batch into four quadrants
//! - **Export**: CSV and JSON renderings of a batch
//! - **Config**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Prioritizer`]: Scoring pipeline entry point
//! - [`ScoredTask`]: One ranked task
//! - [`EisenhowerMatrix`]: Quadrant grouping
//! - [`Config`]: Application configuration management

pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod matrix;
pub mod normalize;
pub mod prioritizer;
pub mod scoring;
pub mod task;

pub use classify::{classify, Priority};
pub use config::Config;
pub use error::{ConfigError, CoreError, ModelError, ValidationError};
pub use export::{to_csv, to_json, to_json_report, OutputFormat, Report};
pub use input::parse_task_input;
pub use matrix::{assign_quadrants, build_matrix, EisenhowerMatrix, Quadrant};
pub use normalize::{normalize_scores, normalize_values};
pub use prioritizer::{validate_batch, Prioritizer, ScoringMode};
pub use scoring::{HeuristicConfig, HeuristicScorer, ModelConfig, ModelScorer, TaskScorer};
pub use task::{RawScore, ScoreSource, ScoredTask};
