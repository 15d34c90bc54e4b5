//! Match game: pair each spelling tile with its translation tile.

use crate::config::MatchConfig;
use crate::effect::{Drill, Effect, TimerId, TimerSlot};
use crate::error::{CoreError, Result};
use crate::optimistic::{MutationId, SyncOutcome};
use crate::summary::accuracy;
use crate::types::{PairCount, Tile, TileSide, Word};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum MatchState {
    Idle,
    OneSelected { tile_id: String },
    /// A wrong pair is on display until the mismatch timer fires.
    ResolvingMismatch { first: String, second: String },
    Completed,
}

/// Pick up to `pair_count` words and deal two shuffled tiles for each.
pub fn deal_tiles<R: Rng + ?Sized>(pool: &[Word], pair_count: PairCount, rng: &mut R) -> Vec<Tile> {
    let count = pair_count.to_value().min(pool.len());
    let mut sample: Vec<&Word> = pool.iter().collect();
    sample.shuffle(rng);

    let mut tiles: Vec<Tile> = sample
        .into_iter()
        .take(count)
        .flat_map(|w| [Tile::new(TileSide::Source, w), Tile::new(TileSide::Target, w)])
        .collect();
    tiles.shuffle(rng);
    tiles
}

#[derive(Debug)]
pub struct MatchGame<R> {
    pool: Vec<Word>,
    pair_count: PairCount,
    tiles: Vec<Tile>,
    state: MatchState,
    mistakes: usize,
    mismatch: TimerSlot,
    config: MatchConfig,
    rng: R,
}

impl<R: Rng> MatchGame<R> {
    pub fn new(pool: Vec<Word>, pair_count: PairCount, config: MatchConfig, mut rng: R) -> Self {
        let tiles = deal_tiles(&pool, pair_count, &mut rng);
        tracing::debug!(tiles = tiles.len(), "match game dealt");
        Self {
            pool,
            pair_count,
            tiles,
            state: MatchState::Idle,
            mistakes: 0,
            mismatch: TimerSlot::default(),
            config,
            rng,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, tile_id: &str) -> Result<&Tile> {
        self.tiles
            .iter()
            .find(|t| t.id == tile_id)
            .ok_or_else(|| CoreError::UnknownTile(tile_id.to_string()))
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn pair_count(&self) -> PairCount {
        self.pair_count
    }

    pub fn selected(&self) -> Option<&str> {
        match &self.state {
            MatchState::OneSelected { tile_id } => Some(tile_id),
            _ => None,
        }
    }

    pub fn mistakes(&self) -> usize {
        self.mistakes
    }

    pub fn matched_pairs(&self) -> usize {
        self.tiles.iter().filter(|t| t.matched).count() / 2
    }

    pub fn accuracy(&self) -> u32 {
        accuracy(self.matched_pairs(), self.mistakes)
    }

    /// Fraction of tiles matched, 0.0 for an empty board.
    pub fn progress(&self) -> f64 {
        if self.state == MatchState::Completed {
            return 1.0;
        }
        if self.tiles.is_empty() {
            return 0.0;
        }
        self.tiles.iter().filter(|t| t.matched).count() as f64 / self.tiles.len() as f64
    }

    pub fn click(&mut self, tile_id: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        let (word_id, matched) = match self.tile(tile_id) {
            Ok(tile) => (tile.word_id.clone(), tile.matched),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring click");
                return effects;
            }
        };
        if matched {
            return effects;
        }

        match std::mem::replace(&mut self.state, MatchState::Idle) {
            MatchState::Idle => {
                self.state = MatchState::OneSelected {
                    tile_id: tile_id.to_string(),
                };
            }
            MatchState::OneSelected { tile_id: first } if first == tile_id => {}
            MatchState::OneSelected { tile_id: first } => {
                let first_word = self
                    .tiles
                    .iter()
                    .find(|t| t.id == first)
                    .map(|t| t.word_id.clone());
                if first_word.as_deref() == Some(word_id.as_str()) {
                    for tile in self
                        .tiles
                        .iter_mut()
                        .filter(|t| t.id == first || t.id == tile_id)
                    {
                        tile.matched = true;
                    }
                    if self.tiles.iter().all(|t| t.matched) {
                        self.state = MatchState::Completed;
                        tracing::info!(mistakes = self.mistakes, "match game completed");
                    }
                } else {
                    self.mistakes += 1;
                    self.state = MatchState::ResolvingMismatch {
                        first,
                        second: tile_id.to_string(),
                    };
                    self.mismatch.arm(self.config.mismatch_delay(), &mut effects);
                }
            }
            // input is locked while a wrong pair is shown
            state @ (MatchState::ResolvingMismatch { .. } | MatchState::Completed) => {
                self.state = state;
            }
        }
        effects
    }

    /// Deal a fresh board from the same pool.
    pub fn restart(&mut self, pair_count: PairCount) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.mismatch.cancel(&mut effects);
        self.pair_count = pair_count;
        self.tiles = deal_tiles(&self.pool, pair_count, &mut self.rng);
        self.state = MatchState::Idle;
        self.mistakes = 0;
        effects
    }
}

impl<R: Rng> Drill for MatchGame<R> {
    fn name(&self) -> &'static str {
        "match"
    }

    fn on_timer(&mut self, timer: TimerId) -> Vec<Effect> {
        if self.mismatch.fire(timer) && matches!(self.state, MatchState::ResolvingMismatch { .. }) {
            self.state = MatchState::Idle;
        }
        Vec::new()
    }

    fn on_sync_result(&mut self, _mutation: MutationId, _outcome: SyncOutcome) -> Vec<Effect> {
        Vec::new()
    }

    fn is_completed(&self) -> bool {
        self.state == MatchState::Completed
    }
}
