//! Error types for wordbook-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Lookups that can fail outside of drill interaction.
///
/// Clicks and key presses on invalid targets are ignored rather than reported.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown word {0}")]
    UnknownWord(String),

    #[error("unknown tile {0}")]
    UnknownTile(String),

    #[error("study list {number} does not exist ({available} available)")]
    UnknownList { number: usize, available: usize },
}
