//! Offline heuristic scorer.
//!
//! Scores tasks from their text alone:
//! - Base score (default 40)
//! - Each urgency keyword found: +15
//! - Each impact keyword found: +10
//! - Length penalty: one point per 30 characters, at most 10
//!
//! The result is clamped to [5, 95]. Same text, same score, always.

use serde::{Deserialize, Serialize};

use super::signals::{count_hits, KeywordHits};
use super::TaskScorer;
use crate::task::{RawScore, ScoreSource};

/// Rationale attached to every heuristic result.
pub const HEURISTIC_RATIONALE: &str =
    "Offline heuristic: estimated based on urgency/impact keywords and task length.";

/// Heuristic weights and keyword lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicConfig {
    #[serde(default = "default_base_score")]
    pub base_score: i32,
    #[serde(default = "default_urgency_keywords")]
    pub urgency_keywords: Vec<String>,
    #[serde(default = "default_impact_keywords")]
    pub impact_keywords: Vec<String>,
    /// Added per urgency keyword found
    #[serde(default = "default_urgency_weight")]
    pub urgency_weight: i32,
    /// Added per impact keyword found
    #[serde(default = "default_impact_weight")]
    pub impact_weight: i32,
    /// Characters per penalty point
    #[serde(default = "default_length_divisor")]
    pub length_divisor: u32,
    #[serde(default = "default_max_length_penalty")]
    pub max_length_penalty: i32,
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    #[serde(default = "default_max_score")]
    pub max_score: u8,
}

fn default_base_score() -> i32 {
    40
}
fn default_urgency_keywords() -> Vec<String> {
    ["today", "tomorrow", "urgent", "asap", "deadline", "soon"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_impact_keywords() -> Vec<String> {
    ["report", "meeting", "client", "deliverable", "presentation"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_urgency_weight() -> i32 {
    15
}
fn default_impact_weight() -> i32 {
    10
}
fn default_length_divisor() -> u32 {
    30
}
fn default_max_length_penalty() -> i32 {
    10
}
fn default_min_score() -> u8 {
    5
}
fn default_max_score() -> u8 {
    95
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            base_score: default_base_score(),
            urgency_keywords: default_urgency_keywords(),
            impact_keywords: default_impact_keywords(),
            urgency_weight: default_urgency_weight(),
            impact_weight: default_impact_weight(),
            length_divisor: default_length_divisor(),
            max_length_penalty: default_max_length_penalty(),
            min_score: default_min_score(),
            max_score: default_max_score(),
        }
    }
}

/// Deterministic keyword/length scorer.
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    config: HeuristicConfig,
}

impl HeuristicScorer {
    /// Create a scorer with the default weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: HeuristicConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Keyword hits for a task.
    pub fn hits(&self, task: &str) -> KeywordHits {
        KeywordHits {
            urgency: count_hits(task, &self.config.urgency_keywords),
            impact: count_hits(task, &self.config.impact_keywords),
        }
    }

    /// Length penalty: characters / divisor, capped.
    fn length_penalty(&self, task: &str) -> i32 {
        if self.config.length_divisor == 0 {
            return 0;
        }
        let chars = task.chars().count() as u64;
        let points = chars / u64::from(self.config.length_divisor);
        points.min(self.config.max_length_penalty.max(0) as u64) as i32
    }

    /// Raw (pre-normalization) score for a single task.
    pub fn raw_score(&self, task: &str) -> u8 {
        let hits = self.hits(task);
        let urgency = (hits.urgency as i32).saturating_mul(self.config.urgency_weight);
        let impact = (hits.impact as i32).saturating_mul(self.config.impact_weight);
        let score = self
            .config
            .base_score
            .saturating_add(urgency)
            .saturating_add(impact)
            .saturating_sub(self.length_penalty(task));

        let min = i32::from(self.config.min_score);
        let max = i32::from(self.config.max_score).min(100);
        score.min(max).max(min).clamp(0, 100) as u8
    }

    /// Full record for a single task.
    pub fn score_task(&self, task: &str) -> RawScore {
        let hits = self.hits(task);
        RawScore {
            task: task.to_string(),
            score: self.raw_score(task),
            reasoning: HEURISTIC_RATIONALE.to_string(),
            urgency: Some(hits.urgency_signal()),
            importance: Some(hits.importance_signal()),
        }
    }
}

impl TaskScorer for HeuristicScorer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn source(&self) -> ScoreSource {
        ScoreSource::Heuristic
    }

    fn score_batch(&self, tasks: &[String]) -> Option<Vec<RawScore>> {
        Some(tasks.iter().map(|t| self.score_task(t)).collect())
    }
}
