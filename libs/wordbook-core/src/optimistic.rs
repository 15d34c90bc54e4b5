//! Optimistic status mutations and their reconciliation.
//!
//! Every star, learned or note change is applied to local state first and
//! then committed to the word repository. A mutation moves through
//! `Applied -> Committing` when it is handed out, and ends in `Committed`,
//! `RolledBack` or `Unconfirmed` once the repository answers.
//!
//! Only star toggles are rolled back, and only while no newer star toggle
//! for the same word is in flight.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifies one in-flight mutation within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MutationId(pub u64);

/// What a mutation changed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum MutationKind {
    /// Star flag toggled from `previous`.
    Star { previous: bool },
    /// Star set because of a wrong answer.
    AutoStar,
    Learned,
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPhase {
    Applied,
    Committing,
    Committed,
    RolledBack,
    /// The commit failed but the local change was kept.
    Unconfirmed,
}

/// Repository answer for a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Committed,
    Failed(String),
}

impl SyncOutcome {
    pub fn from_result<E: std::fmt::Display>(result: std::result::Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Committed,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// What the owner of the local state must do after a mutation resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing to undo.
    Keep,
    /// Restore the word's star flag to `starred`.
    RollBackStar { word_id: String, starred: bool },
    /// The mutation belongs to a discarded session.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct Mutation {
    pub id: MutationId,
    pub word_id: String,
    pub kind: MutationKind,
    pub phase: MutationPhase,
}

impl Mutation {
    fn start_commit(&mut self) {
        if self.phase == MutationPhase::Applied {
            self.phase = MutationPhase::Committing;
        }
    }
}

/// Session-scoped record of optimistic mutations.
#[derive(Debug, Default)]
pub struct MutationLedger {
    next_id: u64,
    mutations: HashMap<MutationId, Mutation>,
    latest_star: HashMap<String, MutationId>,
}

impl MutationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change that has already been applied locally and is about to
    /// be sent to the repository.
    pub fn begin(&mut self, word_id: &str, kind: MutationKind) -> MutationId {
        self.next_id += 1;
        let id = MutationId(self.next_id);
        let mut mutation = Mutation {
            id,
            word_id: word_id.to_string(),
            kind,
            phase: MutationPhase::Applied,
        };
        mutation.start_commit();

        if matches!(kind, MutationKind::Star { .. }) {
            self.latest_star.insert(word_id.to_string(), id);
        }
        self.mutations.insert(id, mutation);
        id
    }

    /// Finish a mutation with the repository's answer.
    pub fn resolve(&mut self, id: MutationId, outcome: &SyncOutcome) -> Resolution {
        let Some(mutation) = self.mutations.get_mut(&id) else {
            return Resolution::Unknown;
        };
        if mutation.phase != MutationPhase::Committing {
            return Resolution::Keep;
        }

        match outcome {
            SyncOutcome::Committed => {
                mutation.phase = MutationPhase::Committed;
                Resolution::Keep
            }
            SyncOutcome::Failed(reason) => match mutation.kind {
                MutationKind::Star { previous }
                    if self.latest_star.get(&mutation.word_id) == Some(&id) =>
                {
                    tracing::warn!(
                        word_id = %mutation.word_id,
                        %reason,
                        "star sync failed, rolling back"
                    );
                    mutation.phase = MutationPhase::RolledBack;
                    self.latest_star.remove(&mutation.word_id);
                    Resolution::RollBackStar {
                        word_id: mutation.word_id.clone(),
                        starred: previous,
                    }
                }
                kind => {
                    tracing::warn!(
                        word_id = %mutation.word_id,
                        ?kind,
                        %reason,
                        "status sync failed, keeping local change"
                    );
                    mutation.phase = MutationPhase::Unconfirmed;
                    Resolution::Keep
                }
            },
        }
    }

    pub fn phase(&self, id: MutationId) -> Option<MutationPhase> {
        self.mutations.get(&id).map(|m| m.phase)
    }

    /// Mutations still waiting for the repository.
    pub fn pending(&self) -> usize {
        self.mutations
            .values()
            .filter(|m| m.phase == MutationPhase::Committing)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn begin_moves_to_committing() {
        let mut ledger = MutationLedger::new();
        let id = ledger.begin("1", MutationKind::Learned);
        assert_eq!(ledger.phase(id), Some(MutationPhase::Committing));
        assert_eq!(ledger.pending(), 1);
    }

    #[test]
    fn committed_star_is_kept() {
        let mut ledger = MutationLedger::new();
        let id = ledger.begin("1", MutationKind::Star { previous: false });
        assert_eq!(ledger.resolve(id, &SyncOutcome::Committed), Resolution::Keep);
        assert_eq!(ledger.phase(id), Some(MutationPhase::Committed));
        assert_eq!(ledger.pending(), 0);
    }

    #[test]
    fn failed_star_rolls_back_to_previous() {
        let mut ledger = MutationLedger::new();
        let id = ledger.begin("1", MutationKind::Star { previous: true });
        let resolution = ledger.resolve(id, &SyncOutcome::Failed("timeout".into()));
        assert_eq!(
            resolution,
            Resolution::RollBackStar {
                word_id: "1".into(),
                starred: true
            }
        );
        assert_eq!(ledger.phase(id), Some(MutationPhase::RolledBack));
    }

    #[test]
    fn superseded_star_failure_is_not_rolled_back() {
        let mut ledger = MutationLedger::new();
        let first = ledger.begin("1", MutationKind::Star { previous: false });
        let second = ledger.begin("1", MutationKind::Star { previous: true });

        let resolution = ledger.resolve(first, &SyncOutcome::Failed("offline".into()));
        assert_eq!(resolution, Resolution::Keep);
        assert_eq!(ledger.phase(first), Some(MutationPhase::Unconfirmed));
        assert_eq!(ledger.phase(second), Some(MutationPhase::Committing));
    }

    #[test]
    fn failed_note_is_kept() {
        let mut ledger = MutationLedger::new();
        let id = ledger.begin("1", MutationKind::Note);
        assert_eq!(
            ledger.resolve(id, &SyncOutcome::Failed("500".into())),
            Resolution::Keep
        );
        assert_eq!(ledger.phase(id), Some(MutationPhase::Unconfirmed));
    }

    #[test]
    fn unknown_and_repeated_resolutions() {
        let mut ledger = MutationLedger::new();
        assert_eq!(
            ledger.resolve(MutationId(42), &SyncOutcome::Committed),
            Resolution::Unknown
        );

        let id = ledger.begin("1", MutationKind::Star { previous: false });
        ledger.resolve(id, &SyncOutcome::Committed);
        assert_eq!(
            ledger.resolve(id, &SyncOutcome::Failed("late".into())),
            Resolution::Keep
        );
        assert_eq!(ledger.phase(id), Some(MutationPhase::Committed));
    }
}
