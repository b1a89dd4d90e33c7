//! Prioritization pipeline.
//!
//! Score → normalize → stable sort (descending) → label. The model scorer is
//! tried first when requested; if it cannot score the batch the heuristic
//! scorer takes over for the whole batch. Model and heuristic scores are
//! never mixed.

use tracing::{debug, info};

use crate::classify::classify;
use crate::config::Config;
use crate::error::{Result, ValidationError};
use crate::normalize::normalize_scores;
use crate::scoring::{HeuristicScorer, ModelScorer, TaskScorer};
use crate::task::{RawScore, ScoreSource, ScoredTask};

/// Whether to try the model before the offline heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    Model,
    Offline,
}

impl ScoringMode {
    pub fn from_use_model(use_model: bool) -> Self {
        if use_model {
            ScoringMode::Model
        } else {
            ScoringMode::Offline
        }
    }
}

/// Reject empty batches and blank tasks before any scorer runs.
pub fn validate_batch(tasks: &[String]) -> Result<(), ValidationError> {
    if tasks.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }
    if let Some(index) = tasks.iter().position(|t| t.trim().is_empty()) {
        return Err(ValidationError::BlankTask { index });
    }
    Ok(())
}

/// Runs a batch through scoring, normalization, sorting and labelling.
pub struct Prioritizer {
    model: Option<Box<dyn TaskScorer>>,
    heuristic: HeuristicScorer,
}

impl Default for Prioritizer {
    fn default() -> Self {
        Self::new(HeuristicScorer::new())
    }
}

impl Prioritizer {
    /// Offline-only prioritizer.
    pub fn new(heuristic: HeuristicScorer) -> Self {
        Self {
            model: None,
            heuristic,
        }
    }

    /// Attach a scorer to try before the heuristic.
    pub fn with_model(mut self, scorer: impl TaskScorer + 'static) -> Self {
        self.model = Some(Box::new(scorer));
        self
    }

    /// Build from configuration and an already-resolved credential.
    pub fn from_config(config: &Config, api_key: Option<String>) -> Self {
        let heuristic = HeuristicScorer::with_config(config.heuristic.clone());
        Self::new(heuristic).with_model(ModelScorer::new(config.model.model_config(api_key)))
    }

    pub fn heuristic(&self) -> &HeuristicScorer {
        &self.heuristic
    }

    /// Prioritize a batch of tasks.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty batch or a blank task. Model
    /// failures are never returned; they fall back to the heuristic.
    pub fn prioritize(&self, tasks: &[String], mode: ScoringMode) -> Result<Vec<ScoredTask>> {
        validate_batch(tasks)?;

        let (source, mut batch) = self.score(tasks, mode);
        normalize_scores(&mut batch);

        let mut results: Vec<ScoredTask> =
            batch.into_iter().map(|raw| self.finish(raw, source)).collect();

        // sort_by is stable: ties keep input order
        results.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(results)
    }

    fn score(&self, tasks: &[String], mode: ScoringMode) -> (ScoreSource, Vec<RawScore>) {
        if mode == ScoringMode::Model {
            if let Some(model) = &self.model {
                match model.score_batch(tasks) {
                    Some(batch) if is_complete(&batch, tasks) => {
                        debug!(scorer = model.name(), "using model scores");
                        return (model.source(), batch);
                    }
                    Some(_) => {
                        info!(scorer = model.name(), "model batch incomplete, using offline heuristic");
                    }
                    None => {
                        info!(scorer = model.name(), "model unavailable, using offline heuristic");
                    }
                }
            }
        }

        let batch = tasks.iter().map(|t| self.heuristic.score_task(t)).collect();
        (ScoreSource::Heuristic, batch)
    }

    /// Fill missing signals from keywords and attach the priority label.
    fn finish(&self, raw: RawScore, source: ScoreSource) -> ScoredTask {
        let hits = self.heuristic.hits(&raw.task);
        ScoredTask {
            priority: classify(raw.score),
            urgency: raw.urgency.unwrap_or_else(|| hits.urgency_signal()),
            importance: raw.importance.unwrap_or_else(|| hits.importance_signal()),
            task: raw.task,
            score: raw.score,
            reasoning: raw.reasoning,
            source,
            quadrant: None,
        }
    }
}

/// A usable batch has one in-range record per task, each with a rationale.
fn is_complete(batch: &[RawScore], tasks: &[String]) -> bool {
    batch.len() == tasks.len()
        && batch.iter().zip(tasks).all(|(r, t)| {
            r.task == *t && r.score <= 100 && !r.reasoning.trim().is_empty()
        })
}
