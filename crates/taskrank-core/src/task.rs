//! Task records flowing through the scoring pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::Priority;
use crate::matrix::Quadrant;

/// Which scorer produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Model,
    Heuristic,
}

impl fmt::Display for ScoreSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreSource::Model => write!(f, "model"),
            ScoreSource::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// A scorer's output for one task, before batch normalization.
///
/// `urgency` and `importance` are `None` when the scorer did not supply
/// them; the prioritizer fills them from keyword signals.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScore {
    pub task: String,
    pub score: u8,
    pub reasoning: String,
    pub urgency: Option<f64>,
    pub importance: Option<f64>,
}

/// A fully scored, normalized and labelled task.
///
/// All fields are scalars so a batch flattens directly into CSV rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTask {
    /// Original task text, unmodified
    pub task: String,
    /// Batch-relative score in [0, 100]
    pub score: u8,
    pub priority: Priority,
    /// Urgency signal in [0, 1]
    pub urgency: f64,
    /// Importance signal in [0, 1]
    pub importance: f64,
    pub reasoning: String,
    pub source: ScoreSource,
    /// Set only once a matrix has been built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quadrant: Option<Quadrant>,
}
