//! Priority labels.
//!
//! Thresholds are fixed at 80 (High) and 50 (Medium) and are applied after
//! batch normalization, so a label describes a task's standing within its
//! own batch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum normalized score labelled High.
pub const HIGH_THRESHOLD: u8 = 80;
/// Minimum normalized score labelled Medium.
pub const MEDIUM_THRESHOLD: u8 = 50;

/// High/Medium/Low priority label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Ordinal level, higher is more pressing.
    pub fn level(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label a normalized score.
pub fn classify(score: u8) -> Priority {
    if score >= HIGH_THRESHOLD {
        Priority::High
    } else if score >= MEDIUM_THRESHOLD {
        Priority::Medium
    } else {
        Priority::Low
    }
}
