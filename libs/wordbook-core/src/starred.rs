//! Starred words: the per-session star set used by scored drills, and the
//! starred-book operations.

use crate::effect::Effect;
use crate::optimistic::{MutationId, MutationKind, MutationLedger, Resolution, SyncOutcome};
use crate::types::{StatusUpdate, Word};
use std::collections::HashSet;

/// Star state for one drill session.
///
/// Seeded from the words' own flags. Wrong answers add to it; the result
/// screen can toggle entries. Every change is echoed to the repository.
#[derive(Debug, Default)]
pub struct SessionStars {
    starred: HashSet<String>,
    ledger: MutationLedger,
}

impl SessionStars {
    pub fn from_words(words: &[Word]) -> Self {
        Self {
            starred: words
                .iter()
                .filter(|w| w.is_starred)
                .map(|w| w.id.clone())
                .collect(),
            ledger: MutationLedger::new(),
        }
    }

    pub fn contains(&self, word_id: &str) -> bool {
        self.starred.contains(word_id)
    }

    pub fn len(&self) -> usize {
        self.starred.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starred.is_empty()
    }

    /// Star a word after a wrong answer. Failures are not rolled back.
    pub fn mark(&mut self, word_id: &str, effects: &mut Vec<Effect>) {
        if !self.starred.insert(word_id.to_string()) {
            return;
        }
        let mutation = self.ledger.begin(word_id, MutationKind::AutoStar);
        effects.push(Effect::Sync {
            mutation,
            update: StatusUpdate::starred(word_id, true),
        });
    }

    /// Flip a word's star; rolled back if the repository rejects it.
    pub fn toggle(&mut self, word_id: &str, effects: &mut Vec<Effect>) -> bool {
        let previous = self.starred.contains(word_id);
        if previous {
            self.starred.remove(word_id);
        } else {
            self.starred.insert(word_id.to_string());
        }
        let mutation = self.ledger.begin(word_id, MutationKind::Star { previous });
        effects.push(Effect::Sync {
            mutation,
            update: StatusUpdate::starred(word_id, !previous),
        });
        !previous
    }

    pub fn on_sync_result(&mut self, mutation: MutationId, outcome: &SyncOutcome) {
        let resolution = self.ledger.resolve(mutation, outcome);
        if let Resolution::RollBackStar { word_id, starred } = resolution {
            if starred {
                self.starred.insert(word_id);
            } else {
                self.starred.remove(&word_id);
            }
        }
    }
}

/// Words currently starred, in book order.
pub fn starred_words(words: &[Word]) -> Vec<Word> {
    words.iter().filter(|w| w.is_starred).cloned().collect()
}

/// Update that removes a single word from the starred book.
pub fn unstar(word_id: &str) -> StatusUpdate {
    StatusUpdate::starred(word_id, false)
}

/// One batch that clears every starred word.
pub fn clear_all(words: &[Word]) -> Vec<StatusUpdate> {
    words
        .iter()
        .filter(|w| w.is_starred)
        .map(|w| unstar(&w.id))
        .collect()
}
