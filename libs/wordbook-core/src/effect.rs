//! Side effects requested by drill controllers.
//!
//! Controllers are plain state machines. Instead of calling the speech engine,
//! the word repository or a timer themselves, they return [`Effect`]s and are
//! told about the outcome through the [`Drill`] callbacks.

use crate::optimistic::{MutationId, SyncOutcome};
use crate::types::StatusUpdate;
use std::time::Duration;

/// Identifies a single-shot timer started by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Identifies an utterance whose completion the controller waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeechTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Pronounce `text`, cancelling any utterance in progress. With a ticket,
    /// report completion through [`Drill::on_speech_end`].
    Speak {
        text: String,
        ticket: Option<SpeechTicket>,
    },
    /// Send a status update to the word repository and report back through
    /// [`Drill::on_sync_result`].
    Sync {
        mutation: MutationId,
        update: StatusUpdate,
    },
    StartTimer { timer: TimerId, delay: Duration },
    CancelTimer { timer: TimerId },
}

/// Holds the one timer a controller may have pending.
///
/// Arming replaces (and cancels) the previous timer, so a stale timer can
/// never fire against newer state.
#[derive(Debug, Default)]
pub struct TimerSlot {
    issued: u64,
    active: Option<TimerId>,
}

impl TimerSlot {
    pub fn arm(&mut self, delay: Duration, effects: &mut Vec<Effect>) -> TimerId {
        self.cancel(effects);
        self.issued += 1;
        let timer = TimerId(self.issued);
        self.active = Some(timer);
        effects.push(Effect::StartTimer { timer, delay });
        timer
    }

    pub fn cancel(&mut self, effects: &mut Vec<Effect>) {
        if let Some(timer) = self.active.take() {
            effects.push(Effect::CancelTimer { timer });
        }
    }

    /// Consume a fired timer. Returns false for anything but the armed timer.
    pub fn fire(&mut self, timer: TimerId) -> bool {
        if self.active == Some(timer) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }
}

/// Same bookkeeping as [`TimerSlot`] for speech completion callbacks.
#[derive(Debug, Default)]
pub struct SpeechSlot {
    issued: u64,
    awaiting: Option<SpeechTicket>,
}

impl SpeechSlot {
    pub fn issue(&mut self) -> SpeechTicket {
        self.issued += 1;
        let ticket = SpeechTicket(self.issued);
        self.awaiting = Some(ticket);
        ticket
    }

    pub fn complete(&mut self, ticket: SpeechTicket) -> bool {
        if self.awaiting == Some(ticket) {
            self.awaiting = None;
            true
        } else {
            false
        }
    }

    pub fn forget(&mut self) {
        self.awaiting = None;
    }
}

/// Event interface shared by every drill controller.
pub trait Drill {
    /// Drill name used in logs.
    fn name(&self) -> &'static str;

    fn on_timer(&mut self, timer: TimerId) -> Vec<Effect>;

    fn on_speech_end(&mut self, _ticket: SpeechTicket) -> Vec<Effect> {
        Vec::new()
    }

    fn on_sync_result(&mut self, mutation: MutationId, outcome: SyncOutcome) -> Vec<Effect>;

    fn is_completed(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arming_cancels_previous_timer() {
        let mut slot = TimerSlot::default();
        let mut effects = Vec::new();
        let first = slot.arm(Duration::from_millis(800), &mut effects);
        let second = slot.arm(Duration::from_millis(800), &mut effects);

        assert_eq!(
            effects,
            vec![
                Effect::StartTimer {
                    timer: first,
                    delay: Duration::from_millis(800)
                },
                Effect::CancelTimer { timer: first },
                Effect::StartTimer {
                    timer: second,
                    delay: Duration::from_millis(800)
                },
            ]
        );
        assert!(!slot.fire(first));
        assert!(slot.fire(second));
        assert!(!slot.fire(second));
        assert!(!slot.is_armed());
    }

    #[test]
    fn cancel_without_timer_is_silent() {
        let mut slot = TimerSlot::default();
        let mut effects = Vec::new();
        slot.cancel(&mut effects);
        assert!(effects.is_empty());
    }

    #[test]
    fn speech_ticket_completes_once() {
        let mut slot = SpeechSlot::default();
        let old = slot.issue();
        let current = slot.issue();
        assert!(!slot.complete(old));
        assert!(slot.complete(current));
        assert!(!slot.complete(current));
    }
}
