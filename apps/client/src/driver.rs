//! Executes drill effects on the tokio runtime.
//!
//! A [`SessionDriver`] owns one drill controller. Actions are applied
//! through [`SessionDriver::act`]; the effects they return are carried out
//! here and their outcomes come back as [`DriverEvent`]s, which
//! [`SessionDriver::pump`] feeds into the controller.

use crate::repository::WordRepository;
use crate::speech::{SpeechDone, Speaker};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use wordbook_core::{Drill, Effect, MutationId, SpeechTicket, SyncOutcome, TimerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Timer(TimerId),
    SpeechEnd(SpeechTicket),
    Synced {
        mutation: MutationId,
        outcome: SyncOutcome,
    },
}

pub struct SessionDriver<D: Drill> {
    drill: D,
    repository: Arc<dyn WordRepository>,
    speaker: Arc<dyn Speaker>,
    tx: UnboundedSender<DriverEvent>,
    rx: UnboundedReceiver<DriverEvent>,
    timers: HashMap<TimerId, JoinHandle<()>>,
}

impl<D: Drill> SessionDriver<D> {
    pub fn new(drill: D, repository: Arc<dyn WordRepository>, speaker: Arc<dyn Speaker>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tracing::info!(drill = drill.name(), "drill session started");
        Self {
            drill,
            repository,
            speaker,
            tx,
            rx,
            timers: HashMap::new(),
        }
    }

    pub fn drill(&self) -> &D {
        &self.drill
    }

    /// Timers started and not yet fired or cancelled.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Apply a user action and carry out its effects.
    pub fn act<F>(&mut self, action: F)
    where
        F: FnOnce(&mut D) -> Vec<Effect>,
    {
        let effects = action(&mut self.drill);
        self.execute(effects);
    }

    /// Wait for the next event and hand it to the drill.
    ///
    /// Only returns `None` if the channel closed, which cannot happen while
    /// the driver holds its own sender.
    pub async fn pump(&mut self) -> Option<DriverEvent> {
        let event = self.rx.recv().await?;
        self.dispatch(event.clone());
        Some(event)
    }

    /// Hand over any events that are already queued without waiting.
    pub fn pump_ready(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    fn dispatch(&mut self, event: DriverEvent) {
        let effects = match event {
            DriverEvent::Timer(timer) => {
                self.timers.remove(&timer);
                self.drill.on_timer(timer)
            }
            DriverEvent::SpeechEnd(ticket) => self.drill.on_speech_end(ticket),
            DriverEvent::Synced { mutation, outcome } => {
                self.drill.on_sync_result(mutation, outcome)
            }
        };
        self.execute(effects);
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Speak { text, ticket } => {
                    let on_end = ticket.map(|ticket| {
                        let tx = self.tx.clone();
                        Box::new(move || {
                            let _ = tx.send(DriverEvent::SpeechEnd(ticket));
                        }) as SpeechDone
                    });
                    self.speaker.speak(&text, on_end);
                }
                Effect::Sync { mutation, update } => {
                    let repository = self.repository.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = repository.update_study_status(&[update]).await;
                        let outcome = SyncOutcome::from_result(result);
                        let _ = tx.send(DriverEvent::Synced { mutation, outcome });
                    });
                }
                Effect::StartTimer { timer, delay } => {
                    let tx = self.tx.clone();
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(DriverEvent::Timer(timer));
                    });
                    if let Some(old) = self.timers.insert(timer, handle) {
                        old.abort();
                    }
                }
                Effect::CancelTimer { timer } => {
                    if let Some(handle) = self.timers.remove(&timer) {
                        handle.abort();
                    }
                }
            }
        }
    }
}

impl<D: Drill> Drop for SessionDriver<D> {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}
