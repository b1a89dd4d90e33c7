//! Keyword hit counting.

/// Number of distinct urgency and impact keywords found in a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordHits {
    pub urgency: usize,
    pub impact: usize,
}

impl KeywordHits {
    /// Urgency signal in [0, 1]. Two hits saturate it.
    pub fn urgency_signal(&self) -> f64 {
        saturate(self.urgency)
    }

    /// Importance signal in [0, 1]. Two hits saturate it.
    pub fn importance_signal(&self) -> f64 {
        saturate(self.impact)
    }
}

fn saturate(hits: usize) -> f64 {
    (hits as f64 / 2.0).min(1.0)
}

/// Count keywords that occur as case-insensitive substrings of `text`.
///
/// Each keyword counts once no matter how often it repeats. Blank keywords
/// are ignored.
pub fn count_hits(text: &str, keywords: &[String]) -> usize {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .filter(|k| lower.contains(&k.to_lowercase()))
        .count()
}
