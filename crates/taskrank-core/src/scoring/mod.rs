//! Task scorers.
//!
//! Two implementations sit behind [`TaskScorer`]:
//!
//! - [`HeuristicScorer`]: deterministic keyword and length scoring, no I/O
//! - [`ModelScorer`]: delegates to an OpenAI-compatible chat completions API
//!
//! A scorer either returns one [`RawScore`] per task, in input order, or
//! `None` when it cannot score the batch. It never returns an error.

mod heuristic;
mod model;
mod signals;

pub use heuristic::{HeuristicConfig, HeuristicScorer, HEURISTIC_RATIONALE};
pub use model::{ModelConfig, ModelScorer, DEFAULT_BASE_URL, DEFAULT_MODEL, SYSTEM_PROMPT};
pub use signals::{count_hits, KeywordHits};

use crate::task::{RawScore, ScoreSource};

/// Something that can turn a batch of task descriptions into raw scores.
pub trait TaskScorer: Send + Sync {
    /// Identifier used in logs (e.g. "heuristic", "openai").
    fn name(&self) -> &str;

    /// Source tag attached to results from this scorer.
    fn source(&self) -> ScoreSource;

    /// Score every task, or return `None` if the batch cannot be scored.
    fn score_batch(&self, tasks: &[String]) -> Option<Vec<RawScore>>;
}
