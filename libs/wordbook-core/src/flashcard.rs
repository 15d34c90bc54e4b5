//! Flashcard drill: sequential review with flip, swipe navigation and
//! automatic "learned" marking.

use crate::config::{DragConfig, FlashcardConfig};
use crate::effect::{Drill, Effect, TimerId, TimerSlot};
use crate::optimistic::{MutationId, MutationKind, MutationLedger, Resolution, SyncOutcome};
use crate::types::{StatusUpdate, Word};
use std::collections::HashSet;

/// Keyboard input understood by the flashcard drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Space,
    Enter,
}

/// What a released drag amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRelease {
    /// Dragged right past the threshold.
    Prev,
    /// Dragged left past the threshold.
    Next,
    /// Barely moved; treated as a click on the card.
    Tap,
    /// Moved, but not far enough. The card snaps back.
    Revert,
}

/// Converts pointer movement into a damped card offset and a release outcome.
#[derive(Debug, Clone)]
pub struct DragGesture {
    config: DragConfig,
    start_x: Option<f64>,
    offset: f64,
}

impl DragGesture {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            start_x: None,
            offset: 0.0,
        }
    }

    pub fn begin(&mut self, x: f64) {
        self.start_x = Some(x);
        self.offset = 0.0;
    }

    /// Track the pointer; returns the damped offset to render.
    pub fn move_to(&mut self, x: f64) -> f64 {
        if let Some(start) = self.start_x {
            self.offset = (x - start) * self.config.damping;
        }
        self.offset
    }

    pub fn release(&mut self) -> Option<DragRelease> {
        self.start_x.take()?;
        let offset = std::mem::take(&mut self.offset);
        let release = if offset > self.config.threshold_px {
            DragRelease::Prev
        } else if offset < -self.config.threshold_px {
            DragRelease::Next
        } else if offset.abs() < self.config.tap_tolerance_px {
            DragRelease::Tap
        } else {
            DragRelease::Revert
        };
        Some(release)
    }

    pub fn is_dragging(&self) -> bool {
        self.start_x.is_some()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

/// State of one flashcard session over a word list.
#[derive(Debug)]
pub struct FlashcardSession {
    words: Vec<Word>,
    index: usize,
    flipped: bool,
    completed: bool,
    config: FlashcardConfig,
    transition: TimerSlot,
    drag: DragGesture,
    /// Words marked learned during this session.
    marked: HashSet<String>,
    ledger: MutationLedger,
}

impl FlashcardSession {
    pub fn new(words: Vec<Word>, config: FlashcardConfig) -> Self {
        let drag = DragGesture::new(config.drag.clone());
        Self {
            words,
            index: 0,
            flipped: false,
            completed: false,
            config,
            transition: TimerSlot::default(),
            drag,
            marked: HashSet::new(),
            ledger: MutationLedger::new(),
        }
    }

    pub fn current(&self) -> Option<&Word> {
        self.words.get(self.index)
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_armed()
    }

    /// Fraction of the list reached, counting the current card.
    pub fn progress(&self) -> f64 {
        if self.words.is_empty() {
            return 0.0;
        }
        (self.index + 1) as f64 / self.words.len() as f64
    }

    /// Learned on the server or marked during this session.
    pub fn is_learned(&self, word_id: &str) -> bool {
        self.marked.contains(word_id)
            || self.words.iter().any(|w| w.id == word_id && w.is_learned)
    }

    pub fn drag_offset(&self) -> f64 {
        self.drag.offset()
    }

    pub fn next(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.can_navigate() {
            return effects;
        }
        self.mark_current_learned(&mut effects);
        if self.index + 1 >= self.words.len() {
            self.completed = true;
            tracing::info!(words = self.words.len(), "flashcard session completed");
        } else {
            self.move_to(self.index + 1, &mut effects);
        }
        effects
    }

    pub fn prev(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.can_navigate() || self.index == 0 {
            return effects;
        }
        self.mark_current_learned(&mut effects);
        self.move_to(self.index - 1, &mut effects);
        effects
    }

    /// Turn the card over. Returns false when ignored.
    pub fn flip(&mut self) -> bool {
        if self.completed || self.is_transitioning() || self.current().is_none() {
            return false;
        }
        self.flipped = !self.flipped;
        true
    }

    pub fn toggle_star(&mut self) -> Vec<Effect> {
        let Some(word) = self.words.get_mut(self.index) else {
            return Vec::new();
        };
        let previous = word.is_starred;
        word.is_starred = !previous;
        let update = StatusUpdate::starred(word.id.clone(), !previous);
        let mutation = self.ledger.begin(&word.id, MutationKind::Star { previous });
        vec![Effect::Sync { mutation, update }]
    }

    /// Replace the current word's note. A blank note clears it.
    pub fn save_note(&mut self, text: &str) -> Vec<Effect> {
        let Some(word) = self.words.get_mut(self.index) else {
            return Vec::new();
        };
        let text = text.trim();
        word.note = (!text.is_empty()).then(|| text.to_string());
        let update = StatusUpdate::notes(word.id.clone(), text);
        let mutation = self.ledger.begin(&word.id, MutationKind::Note);
        vec![Effect::Sync { mutation, update }]
    }

    pub fn restart(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.transition.cancel(&mut effects);
        self.index = 0;
        self.flipped = false;
        self.completed = false;
        self.marked.clear();
        self.drag = DragGesture::new(self.config.drag.clone());
        effects
    }

    pub fn speak_current(&self) -> Vec<Effect> {
        self.current()
            .map(|w| Effect::Speak {
                text: w.en.clone(),
                ticket: None,
            })
            .into_iter()
            .collect()
    }

    pub fn speak_example(&self) -> Vec<Effect> {
        self.current()
            .and_then(|w| w.example.clone())
            .map(|text| Effect::Speak { text, ticket: None })
            .into_iter()
            .collect()
    }

    pub fn key(&mut self, key: Key) -> Vec<Effect> {
        match key {
            Key::Left => self.prev(),
            Key::Right => self.next(),
            Key::Space | Key::Enter => {
                self.flip();
                Vec::new()
            }
        }
    }

    /// Start dragging the card. Ignored during a transition or after completion.
    pub fn begin_drag(&mut self, x: f64) -> bool {
        if self.completed || self.is_transitioning() {
            return false;
        }
        self.drag.begin(x);
        true
    }

    pub fn drag_to(&mut self, x: f64) -> f64 {
        self.drag.move_to(x)
    }

    /// Release the card: past the threshold this is `prev`/`next`, a tap flips.
    pub fn end_drag(&mut self) -> Vec<Effect> {
        match self.drag.release() {
            Some(DragRelease::Prev) => self.prev(),
            Some(DragRelease::Next) => self.next(),
            Some(DragRelease::Tap) => {
                self.flip();
                Vec::new()
            }
            Some(DragRelease::Revert) | None => Vec::new(),
        }
    }

    fn can_navigate(&self) -> bool {
        !self.completed && !self.is_transitioning() && !self.words.is_empty()
    }

    fn move_to(&mut self, index: usize, effects: &mut Vec<Effect>) {
        self.index = index;
        self.flipped = false;
        if self.config.transition_ms > 0 {
            self.transition.arm(self.config.transition(), effects);
        }
    }

    fn mark_current_learned(&mut self, effects: &mut Vec<Effect>) {
        let Some(word) = self.words.get(self.index) else {
            return;
        };
        if word.is_learned || self.marked.contains(&word.id) {
            return;
        }
        let word_id = word.id.clone();
        self.marked.insert(word_id.clone());
        let mutation = self.ledger.begin(&word_id, MutationKind::Learned);
        tracing::debug!(%word_id, "marking word learned");
        effects.push(Effect::Sync {
            mutation,
            update: StatusUpdate::learned(word_id),
        });
    }
}

impl Drill for FlashcardSession {
    fn name(&self) -> &'static str {
        "flashcard"
    }

    fn on_timer(&mut self, timer: TimerId) -> Vec<Effect> {
        self.transition.fire(timer);
        Vec::new()
    }

    fn on_sync_result(&mut self, mutation: MutationId, outcome: SyncOutcome) -> Vec<Effect> {
        let resolution = self.ledger.resolve(mutation, &outcome);
        if let Resolution::RollBackStar { word_id, starred } = resolution {
            if let Some(word) = self.words.iter_mut().find(|w| w.id == word_id) {
                word.is_starred = starred;
            }
        }
        Vec::new()
    }

    fn is_completed(&self) -> bool {
        self.completed
    }
}
