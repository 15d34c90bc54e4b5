//! Dictation drill: hear or read the definition, type the spelling.

use crate::config::DictationConfig;
use crate::effect::{Drill, Effect, SpeechSlot, SpeechTicket, TimerId, TimerSlot};
use crate::matching::compare_answers;
use crate::optimistic::{MutationId, SyncOutcome};
use crate::starred::SessionStars;
use crate::summary::{MissedWord, SessionStats, SessionSummary};
use crate::types::{Attempt, Word};
use serde::{Deserialize, Serialize};

/// Feedback state of the answer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DictationStatus {
    Idle,
    Correct,
    Wrong,
}

#[derive(Debug)]
pub struct DictationSession {
    words: Vec<Word>,
    index: usize,
    input: String,
    status: DictationStatus,
    show_hint: bool,
    /// Correct spelling revealed after a wrong answer.
    show_answer: bool,
    attempts: Vec<Attempt>,
    completed: bool,
    stars: SessionStars,
    advance: TimerSlot,
    speech: SpeechSlot,
    config: DictationConfig,
}

impl DictationSession {
    pub fn new(words: Vec<Word>, config: DictationConfig) -> Self {
        let stars = SessionStars::from_words(&words);
        Self {
            words,
            index: 0,
            input: String::new(),
            status: DictationStatus::Idle,
            show_hint: false,
            show_answer: false,
            attempts: Vec::new(),
            completed: false,
            stars,
            advance: TimerSlot::default(),
            speech: SpeechSlot::default(),
            config,
        }
    }

    pub fn current(&self) -> Option<&Word> {
        self.words.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> DictationStatus {
        self.status
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn is_hint_shown(&self) -> bool {
        self.show_hint
    }

    pub fn is_answer_revealed(&self) -> bool {
        self.show_answer
    }

    pub fn is_starred(&self, word_id: &str) -> bool {
        self.stars.contains(word_id)
    }

    /// Track the answer field. Typing after the revealed answer has been
    /// hidden clears the wrong marker.
    pub fn set_input(&mut self, text: &str) {
        if self.status == DictationStatus::Correct || self.completed {
            return;
        }
        if self.status == DictationStatus::Wrong && !self.show_answer {
            self.status = DictationStatus::Idle;
        }
        self.input = text.to_string();
    }

    pub fn toggle_hint(&mut self) {
        self.show_hint = !self.show_hint;
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

    pub fn submit(&mut self, input: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.status == DictationStatus::Correct || self.completed {
            return effects;
        }
        let Some(word) = self.words.get(self.index) else {
            return effects;
        };
        let target = word.en.clone();
        let word_id = word.id.clone();

        let result = compare_answers(
            input,
            &target,
            self.config.matching_mode,
            self.config.fuzzy_threshold,
        );

        if result.is_correct {
            self.status = DictationStatus::Correct;
            self.input = input.to_string();
            self.record_attempt(&word_id, true, input, &mut effects);
            effects.push(Effect::Speak {
                text: target,
                ticket: None,
            });
            self.advance.arm(self.config.advance_delay(), &mut effects);
        } else {
            self.status = DictationStatus::Wrong;
            self.record_attempt(&word_id, false, input, &mut effects);
            self.input.clear();
            self.show_answer = true;
            self.advance.cancel(&mut effects);
            let ticket = self.speech.issue();
            effects.push(Effect::Speak {
                text: target,
                ticket: Some(ticket),
            });
        }
        tracing::debug!(%word_id, status = ?self.status, "dictation answer checked");
        effects
    }

    /// Finish now, keeping the attempts made so far.
    pub fn end_early(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.advance.cancel(&mut effects);
        self.speech.forget();
        self.completed = true;
        tracing::info!(attempts = self.attempts.len(), "dictation ended early");
        effects
    }

    pub fn restart(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.advance.cancel(&mut effects);
        self.index = 0;
        self.attempts.clear();
        self.completed = false;
        self.reset_word_state();
        effects
    }

    pub fn stats(&self) -> SessionStats {
        let correct = self.attempts.iter().filter(|a| a.is_correct).count();
        SessionStats::from_counts(correct, self.attempts.len() - correct)
    }

    pub fn summary(&self) -> SessionSummary {
        let missed = self
            .attempts
            .iter()
            .filter(|a| !a.is_correct)
            .filter_map(|a| {
                let word = self.words.iter().find(|w| w.id == a.word_id)?;
                Some(MissedWord {
                    word: word.clone(),
                    user_answer: Some(a.user_answer.clone()),
                    starred: self.stars.contains(&a.word_id),
                })
            })
            .collect();
        SessionSummary {
            stats: self.stats(),
            missed,
        }
    }

    /// Star or unstar a word from the result list.
    pub fn toggle_star(&mut self, word_id: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.words.iter().any(|w| w.id == word_id) {
            self.stars.toggle(word_id, &mut effects);
        }
        effects
    }

    fn record_attempt(
        &mut self,
        word_id: &str,
        is_correct: bool,
        answer: &str,
        effects: &mut Vec<Effect>,
    ) {
        if self.attempts.iter().any(|a| a.word_id == word_id) {
            return;
        }
        self.attempts.push(Attempt {
            word_id: word_id.to_string(),
            is_correct,
            user_answer: answer.to_string(),
        });
        if !is_correct {
            self.stars.mark(word_id, effects);
        }
    }

    fn advance_word(&mut self) {
        if self.index + 1 < self.words.len() {
            self.index += 1;
            self.reset_word_state();
        } else {
            self.completed = true;
            tracing::info!(attempts = self.attempts.len(), "dictation completed");
        }
    }

    fn reset_word_state(&mut self) {
        self.input.clear();
        self.show_hint = false;
        self.show_answer = false;
        self.status = DictationStatus::Idle;
        self.speech.forget();
    }
}

impl Drill for DictationSession {
    fn name(&self) -> &'static str {
        "dictation"
    }

    fn on_timer(&mut self, timer: TimerId) -> Vec<Effect> {
        if self.advance.fire(timer) && !self.completed {
            self.advance_word();
        }
        Vec::new()
    }

    fn on_speech_end(&mut self, ticket: SpeechTicket) -> Vec<Effect> {
        if self.speech.complete(ticket) {
            self.show_answer = false;
            if self.status == DictationStatus::Wrong {
                self.status = DictationStatus::Idle;
            }
        }
        Vec::new()
    }

    fn on_sync_result(&mut self, mutation: MutationId, outcome: SyncOutcome) -> Vec<Effect> {
        self.stars.on_sync_result(mutation, &outcome);
        Vec::new()
    }

    fn is_completed(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MatchingMode;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn cat_dog() -> DictationSession {
        DictationSession::new(
            vec![Word::new("cat", "cat", "猫"), Word::new("dog", "dog", "狗")],
            DictationConfig::default(),
        )
    }

    fn started_timer(effects: &[Effect]) -> TimerId {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::StartTimer { timer, .. } => Some(*timer),
                _ => None,
            })
            .expect("timer started")
    }

    fn speech_ticket(effects: &[Effect]) -> SpeechTicket {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Speak {
                    ticket: Some(ticket),
                    ..
                } => Some(*ticket),
                _ => None,
            })
            .expect("speech ticket")
    }

    #[test]
    fn cat_then_dog_scenario() {
        let mut s = cat_dog();

        let effects = s.submit("cat");
        assert_eq!(s.status(), DictationStatus::Correct);
        assert_eq!(
            s.attempts(),
            &[Attempt {
                word_id: "cat".into(),
                is_correct: true,
                user_answer: "cat".into()
            }]
        );
        assert!(effects.contains(&Effect::Speak {
            text: "cat".into(),
            ticket: None
        }));
        assert!(effects.contains(&Effect::StartTimer {
            timer: started_timer(&effects),
            delay: Duration::from_millis(800)
        }));

        s.on_timer(started_timer(&effects));
        assert_eq!(s.index(), 1);
        assert_eq!(s.status(), DictationStatus::Idle);

        let effects = s.submit("wrong");
        assert_eq!(s.status(), DictationStatus::Wrong);
        assert_eq!(s.attempts().len(), 2);
        assert!(!s.attempts()[1].is_correct);
        assert!(s.is_starred("dog"));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Sync { update, .. }
                if update.word_id == "dog" && update.is_starred == Some(true)
        )));
    }

    #[test]
    fn matching_ignores_case_and_surrounding_space() {
        let mut s = cat_dog();
        s.submit("  CaT ");
        assert_eq!(s.status(), DictationStatus::Correct);
    }

    #[test]
    fn double_submit_records_once() {
        let mut s = cat_dog();
        s.submit("cat");
        let again = s.submit("cat");
        assert!(again.is_empty());
        assert_eq!(s.attempts().len(), 1);
        assert_eq!(s.status(), DictationStatus::Correct);
    }

    #[test]
    fn first_attempt_is_authoritative() {
        let mut s = cat_dog();
        s.submit("cta");
        s.submit("cat");
        assert_eq!(s.status(), DictationStatus::Correct);
        assert_eq!(s.attempts().len(), 1);
        assert!(!s.attempts()[0].is_correct);
        assert_eq!(s.stats(), SessionStats::from_counts(0, 1));
    }

    #[test]
    fn wrong_answer_reveals_until_speech_ends() {
        let mut s = cat_dog();
        s.set_input("cta");
        let effects = s.submit("cta");
        assert_eq!(s.input(), "");
        assert!(s.is_answer_revealed());

        // typing while the answer is shown keeps the wrong marker
        s.set_input("c");
        assert_eq!(s.status(), DictationStatus::Wrong);

        s.on_speech_end(speech_ticket(&effects));
        assert!(!s.is_answer_revealed());
        assert_eq!(s.status(), DictationStatus::Idle);
    }

    #[test]
    fn stale_speech_end_is_ignored() {
        let mut s = cat_dog();
        let first = speech_ticket(&s.submit("x"));
        let second = speech_ticket(&s.submit("y"));
        s.on_speech_end(first);
        assert!(s.is_answer_revealed());
        s.on_speech_end(second);
        assert!(!s.is_answer_revealed());
    }

    #[test]
    fn last_word_completes_after_delay() {
        let mut s = DictationSession::new(
            vec![Word::new("1", "emu", "鸸鹋")],
            DictationConfig::default(),
        );
        let effects = s.submit("emu");
        assert!(!s.is_completed());
        s.on_timer(started_timer(&effects));
        assert!(s.is_completed());
    }

    #[test]
    fn end_early_cancels_pending_advance() {
        let mut s = cat_dog();
        let effects = s.submit("cat");
        let timer = started_timer(&effects);

        let cancel = s.end_early();
        assert_eq!(cancel, vec![Effect::CancelTimer { timer }]);
        assert!(s.is_completed());

        s.on_timer(timer);
        assert_eq!(s.index(), 0);
        assert_eq!(s.attempts().len(), 1);
    }

    #[test]
    fn restart_discards_stale_timer() {
        let mut s = cat_dog();
        let timer = started_timer(&s.submit("cat"));
        s.restart();
        s.on_timer(timer);
        assert_eq!(s.index(), 0);
        assert!(s.attempts().is_empty());
        assert_eq!(s.status(), DictationStatus::Idle);
        assert_eq!(s.stats(), SessionStats::default());
    }

    #[test]
    fn restart_keeps_word_flags() {
        let mut words = vec![Word::new("cat", "cat", "猫")];
        words[0].is_learned = true;
        let mut s = DictationSession::new(words, DictationConfig::default());
        s.submit("dog");
        s.restart();
        assert!(s.current().unwrap().is_learned);
        assert!(!s.current().unwrap().is_starred);
    }

    #[test]
    fn summary_lists_wrong_words_with_star_toggle() {
        let mut s = cat_dog();
        let timer = started_timer(&s.submit("cat"));
        s.on_timer(timer);
        s.submit("dgo");
        s.end_early();

        let summary = s.summary();
        assert_eq!(summary.stats, SessionStats::from_counts(1, 1));
        assert_eq!(summary.stats.accuracy, 50);
        assert_eq!(summary.missed.len(), 1);
        assert_eq!(summary.missed[0].word.id, "dog");
        assert_eq!(summary.missed[0].user_answer.as_deref(), Some("dgo"));
        assert!(summary.missed[0].starred);

        let effects = s.toggle_star("dog");
        assert!(!s.summary().missed[0].starred);
        assert!(!s.summary().missed[0].word.is_starred);

        let mutation = match &effects[0] {
            Effect::Sync { mutation, .. } => *mutation,
            other => panic!("unexpected {:?}", other),
        };
        s.on_sync_result(mutation, SyncOutcome::Failed("offline".into()));
        assert!(s.summary().missed[0].starred);
    }

    #[test]
    fn fuzzy_mode_accepts_near_misses() {
        let config = DictationConfig {
            matching_mode: MatchingMode::Fuzzy,
            ..Default::default()
        };
        let mut s = DictationSession::new(vec![Word::new("1", "abandon", "v. 放弃")], config);
        s.submit("abandom");
        assert_eq!(s.status(), DictationStatus::Correct);
    }

    #[test]
    fn empty_list_ignores_submit() {
        let mut s = DictationSession::new(Vec::new(), DictationConfig::default());
        assert!(s.submit("cat").is_empty());
        assert!(s.attempts().is_empty());
        assert_eq!(s.stats().accuracy, 0);
    }
}
