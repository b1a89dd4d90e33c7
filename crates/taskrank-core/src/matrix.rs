//! Eisenhower matrix.
//!
//! Partitions a scored batch into four quadrants by importance and urgency.
//! Rules are checked in a fixed order so every task lands in exactly one
//! quadrant:
//!
//! | importance | urgency | quadrant   |
//! |------------|---------|------------|
//! | high       | high    | `do_now`   |
//! | high       | low     | `schedule` |
//! | low        | high    | `delegate` |
//! | low        | low     | `delete`   |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::task::ScoredTask;

/// Signals at or above this value count as "high".
pub const SIGNAL_THRESHOLD: f64 = 0.5;

/// One cell of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    DoNow,
    Schedule,
    Delegate,
    Delete,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::DoNow,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Delete,
    ];

    /// Classify a pair of signals.
    pub fn classify(urgency: f64, importance: f64) -> Self {
        match (is_high(importance), is_high(urgency)) {
            (true, true) => Quadrant::DoNow,
            (true, false) => Quadrant::Schedule,
            (false, true) => Quadrant::Delegate,
            (false, false) => Quadrant::Delete,
        }
    }

    /// Snake-case key used in exports.
    pub fn key(&self) -> &'static str {
        match self {
            Quadrant::DoNow => "do_now",
            Quadrant::Schedule => "schedule",
            Quadrant::Delegate => "delegate",
            Quadrant::Delete => "delete",
        }
    }

    /// Heading for terminal output.
    pub fn title(&self) -> &'static str {
        match self {
            Quadrant::DoNow => "Do Now (Important + Urgent)",
            Quadrant::Schedule => "Schedule (Important + Not Urgent)",
            Quadrant::Delegate => "Delegate (Not Important + Urgent)",
            Quadrant::Delete => "Delete / Minimize (Not Important + Not Urgent)",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Whether a continuous signal counts as high. NaN is low.
pub fn is_high(signal: f64) -> bool {
    signal >= SIGNAL_THRESHOLD
}

/// Map a categorical label onto a continuous signal.
///
/// `Important` and `Urgent` (any case) are high, everything else is low,
/// including `Not Urgent` and `Medium`.
pub fn signal_from_label(label: &str) -> f64 {
    let label = label.trim();
    if label.eq_ignore_ascii_case("important") || label.eq_ignore_ascii_case("urgent") {
        1.0
    } else {
        0.0
    }
}

/// Tasks grouped by quadrant. Each group keeps batch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EisenhowerMatrix {
    pub do_now: Vec<ScoredTask>,
    pub schedule: Vec<ScoredTask>,
    pub delegate: Vec<ScoredTask>,
    pub delete: Vec<ScoredTask>,
}

impl EisenhowerMatrix {
    pub fn quadrant(&self, quadrant: Quadrant) -> &[ScoredTask] {
        match quadrant {
            Quadrant::DoNow => &self.do_now,
            Quadrant::Schedule => &self.schedule,
            Quadrant::Delegate => &self.delegate,
            Quadrant::Delete => &self.delete,
        }
    }

    fn quadrant_mut(&mut self, quadrant: Quadrant) -> &mut Vec<ScoredTask> {
        match quadrant {
            Quadrant::DoNow => &mut self.do_now,
            Quadrant::Schedule => &mut self.schedule,
            Quadrant::Delegate => &mut self.delegate,
            Quadrant::Delete => &mut self.delete,
        }
    }

    /// Quadrants in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Quadrant, &[ScoredTask])> {
        Quadrant::ALL.into_iter().map(move |q| (q, self.quadrant(q)))
    }

    /// Total number of tasks across all quadrants.
    pub fn len(&self) -> usize {
        self.do_now.len() + self.schedule.len() + self.delegate.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tag every result with its quadrant.
pub fn assign_quadrants(results: &mut [ScoredTask]) {
    for result in results.iter_mut() {
        result.quadrant = Some(Quadrant::classify(result.urgency, result.importance));
    }
}

/// Build the matrix for a scored batch.
///
/// The returned tasks carry their `quadrant`; `results` is not modified.
pub fn build_matrix(results: &[ScoredTask]) -> EisenhowerMatrix {
    let mut matrix = EisenhowerMatrix::default();
    for result in results {
        let quadrant = Quadrant::classify(result.urgency, result.importance);
        let mut tagged = result.clone();
        tagged.quadrant = Some(quadrant);
        matrix.quadrant_mut(quadrant).push(tagged);
    }
    matrix
}
