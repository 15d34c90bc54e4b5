//! Session statistics shared by the scored drills.

use crate::types::Word;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub correct_count: usize,
    pub wrong_count: usize,
    /// Rounded percentage; 0 when nothing was answered.
    pub accuracy: u32,
}

impl SessionStats {
    pub fn from_counts(correct_count: usize, wrong_count: usize) -> Self {
        Self {
            correct_count,
            wrong_count,
            accuracy: accuracy(correct_count, wrong_count),
        }
    }

    pub fn answered(&self) -> usize {
        self.correct_count + self.wrong_count
    }
}

/// `round(hits / (hits + misses) * 100)`, or 0 for an empty denominator.
pub fn accuracy(hits: usize, misses: usize) -> u32 {
    let total = hits + misses;
    if total == 0 {
        return 0;
    }
    (hits as f64 / total as f64 * 100.0).round() as u32
}

/// A word answered wrongly, as listed on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedWord {
    pub word: Word,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    /// Current state of the session star set, not the word's own flag.
    pub starred: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub stats: SessionStats,
    pub missed: Vec<MissedWord>,
}
