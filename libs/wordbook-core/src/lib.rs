//! Core vocabulary drill library shared by the word book client.
//!
//! Provides:
//! - Study list preparation (status overlay, sorting, chunking)
//! - Drill controllers for flashcards, dictation, multiple choice and the match game
//! - Optimistic status mutations with star rollback
//! - Answer matching for typed spellings (Levenshtein distance)
//!
//! Controllers never perform I/O. They return [`Effect`]s and are driven
//! through the [`Drill`] trait.

pub mod choice;
pub mod config;
pub mod dictation;
pub mod effect;
pub mod error;
pub mod flashcard;
pub mod match_game;
pub mod matching;
pub mod optimistic;
pub mod preparer;
pub mod starred;
pub mod summary;
pub mod types;

pub use choice::{build_options, ChoiceResult, ChoiceSession};
pub use config::{
    ChoiceConfig, DictationConfig, DragConfig, DrillConfig, FlashcardConfig, MatchConfig,
    CHUNK_SIZE,
};
pub use dictation::{DictationSession, DictationStatus};
pub use effect::{Drill, Effect, SpeechTicket, TimerId};
pub use error::{CoreError, Result};
pub use flashcard::{DragGesture, DragRelease, FlashcardSession, Key};
pub use match_game::{deal_tiles, MatchGame, MatchState};
pub use matching::{
    compare_answers, levenshtein_distance, normalized_similarity, MatchResult, MatchingMode,
};
pub use optimistic::{
    MutationId, MutationKind, MutationLedger, MutationPhase, Resolution, SyncOutcome,
};
pub use preparer::{StudyList, WordListPreparer};
pub use starred::SessionStars;
pub use summary::{MissedWord, SessionStats, SessionSummary};
pub use types::{
    split_part_of_speech, Attempt, BookProgress, PairCount, SortMode, StatusUpdate, StudyStatus,
    Tile, TileSide, UpdateModule, Word,
};
