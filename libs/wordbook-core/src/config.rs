//! Pacing and gesture settings for the drill controllers.

use crate::matching::MatchingMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Words per study list.
pub const CHUNK_SIZE: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrillConfig {
    pub flashcard: FlashcardConfig,
    pub dictation: DictationConfig,
    pub choice: ChoiceConfig,
    pub matching: MatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardConfig {
    /// Card fly-out time; navigation and flipping are ignored meanwhile.
    /// Zero disables the transition window.
    pub transition_ms: u64,
    pub drag: DragConfig,
}

impl Default for FlashcardConfig {
    fn default() -> Self {
        Self {
            transition_ms: 300,
            drag: DragConfig::default(),
        }
    }
}

impl FlashcardConfig {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    /// Factor applied to raw pointer displacement.
    pub damping: f64,
    /// Damped displacement, in pixels, that turns a release into navigation.
    pub threshold_px: f64,
    /// Damped displacement below which a release counts as a tap.
    pub tap_tolerance_px: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            damping: 0.6,
            threshold_px: 20.0,
            tap_tolerance_px: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictationConfig {
    pub advance_ms: u64,
    pub matching_mode: MatchingMode,
    pub fuzzy_threshold: f64,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            advance_ms: 800,
            matching_mode: MatchingMode::CaseInsensitive,
            fuzzy_threshold: 0.8,
        }
    }
}

impl DictationConfig {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceConfig {
    pub advance_ms: u64,
    pub distractors: usize,
}

impl Default for ChoiceConfig {
    fn default() -> Self {
        Self {
            advance_ms: 1500,
            distractors: 3,
        }
    }
}

impl ChoiceConfig {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// How long a wrong pair stays revealed.
    pub mismatch_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { mismatch_ms: 800 }
    }
}

impl MatchConfig {
    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_ms)
    }
}
