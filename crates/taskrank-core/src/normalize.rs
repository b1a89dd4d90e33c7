//! Batch score normalization.
//!
//! Raw scores from either scorer are rescaled linearly so the batch spans
//! 0..=100: the top task maps to 100, the bottom task to 0. A batch where
//! every task scored the same is left untouched.

use crate::task::RawScore;

/// Rescale `scores` onto 0..=100, preserving order.
///
/// Returns the input unchanged when it is empty or when min == max.
pub fn normalize_values(scores: &[u8]) -> Vec<u8> {
    let (Some(&min), Some(&max)) = (scores.iter().min(), scores.iter().max()) else {
        return Vec::new();
    };

    if min == max {
        return scores.to_vec();
    }

    let span = u32::from(max - min);
    scores
        .iter()
        .map(|&s| (100 * u32::from(s - min) / span) as u8)
        .collect()
}

/// Normalize a scored batch in place.
pub fn normalize_scores(batch: &mut [RawScore]) {
    let raw: Vec<u8> = batch.iter().map(|r| r.score).collect();
    for (record, score) in batch.iter_mut().zip(normalize_values(&raw)) {
        record.score = score;
    }
}
