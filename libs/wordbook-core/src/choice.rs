//! Multiple-choice drill: pick the translation of the shown word.

use crate::config::ChoiceConfig;
use crate::effect::{Drill, Effect, TimerId, TimerSlot};
use crate::optimistic::{MutationId, SyncOutcome};
use crate::starred::SessionStars;
use crate::summary::{MissedWord, SessionStats, SessionSummary};
use crate::types::Word;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of one answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceResult {
    pub word_id: String,
    pub correct: bool,
    /// The option that was picked.
    pub selected: String,
}

/// Build the options for `words[index]`: its translation plus up to
/// `distractors` distinct translations of other words, in random order.
pub fn build_options<R: Rng + ?Sized>(
    words: &[Word],
    index: usize,
    distractors: usize,
    rng: &mut R,
) -> Vec<String> {
    let Some(word) = words.get(index) else {
        return Vec::new();
    };

    let mut pool: Vec<&Word> = words
        .iter()
        .enumerate()
        .filter(|(i, w)| *i != index && w.cn != word.cn)
        .map(|(_, w)| w)
        .collect();
    pool.shuffle(rng);

    let mut seen = HashSet::new();
    let mut options = vec![word.cn.clone()];
    for candidate in pool {
        if options.len() > distractors {
            break;
        }
        if seen.insert(candidate.cn.as_str()) {
            options.push(candidate.cn.clone());
        }
    }
    options.shuffle(rng);
    options
}

#[derive(Debug)]
pub struct ChoiceSession<R> {
    words: Vec<Word>,
    index: usize,
    options: Vec<String>,
    selected: Option<usize>,
    results: Vec<ChoiceResult>,
    correct_count: usize,
    wrong_count: usize,
    completed: bool,
    stars: SessionStars,
    advance: TimerSlot,
    config: ChoiceConfig,
    rng: R,
}

impl<R: Rng> ChoiceSession<R> {
    pub fn new(words: Vec<Word>, config: ChoiceConfig, rng: R) -> Self {
        let stars = SessionStars::from_words(&words);
        let mut session = Self {
            words,
            index: 0,
            options: Vec::new(),
            selected: None,
            results: Vec::new(),
            correct_count: 0,
            wrong_count: 0,
            completed: false,
            stars,
            advance: TimerSlot::default(),
            config,
            rng,
        };
        session.deal();
        session
    }

    pub fn current(&self) -> Option<&Word> {
        self.words.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Position of the correct translation among the options.
    pub fn correct_option(&self) -> Option<usize> {
        let word = self.current()?;
        self.options.iter().position(|o| *o == word.cn)
    }

    pub fn results(&self) -> &[ChoiceResult] {
        &self.results
    }

    pub fn is_starred(&self, word_id: &str) -> bool {
        self.stars.contains(word_id)
    }

    pub fn select(&mut self, option: usize) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.selected.is_some() || self.completed {
            return effects;
        }
        let (Some(word), Some(picked)) = (self.words.get(self.index), self.options.get(option))
        else {
            return effects;
        };
        let correct = *picked == word.cn;
        let word_id = word.id.clone();
        let spelling = word.en.clone();

        self.selected = Some(option);
        self.results.push(ChoiceResult {
            word_id: word_id.clone(),
            correct,
            selected: picked.clone(),
        });
        if correct {
            self.correct_count += 1;
        } else {
            self.wrong_count += 1;
            self.stars.mark(&word_id, &mut effects);
        }
        tracing::debug!(%word_id, correct, "choice answered");

        effects.push(Effect::Speak {
            text: spelling,
            ticket: None,
        });
        self.advance.arm(self.config.advance_delay(), &mut effects);
        effects
    }

    pub fn end_early(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.advance.cancel(&mut effects);
        self.completed = true;
        tracing::info!(answered = self.results.len(), "choice ended early");
        effects
    }

    pub fn restart(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.advance.cancel(&mut effects);
        self.index = 0;
        self.results.clear();
        self.correct_count = 0;
        self.wrong_count = 0;
        self.completed = false;
        self.deal();
        effects
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats::from_counts(self.correct_count, self.wrong_count)
    }

    pub fn summary(&self) -> SessionSummary {
        let missed = self
            .results
            .iter()
            .filter(|r| !r.correct)
            .filter_map(|r| {
                let word = self.words.iter().find(|w| w.id == r.word_id)?;
                Some(MissedWord {
                    word: word.clone(),
                    user_answer: Some(r.selected.clone()),
                    starred: self.stars.contains(&r.word_id),
                })
            })
            .collect();
        SessionSummary {
            stats: self.stats(),
            missed,
        }
    }

    pub fn toggle_star(&mut self, word_id: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.words.iter().any(|w| w.id == word_id) {
            self.stars.toggle(word_id, &mut effects);
        }
        effects
    }

    fn deal(&mut self) {
        self.selected = None;
        self.options = build_options(
            &self.words,
            self.index,
            self.config.distractors,
            &mut self.rng,
        );
    }

    fn advance_word(&mut self) {
        if self.index + 1 < self.words.len() {
            self.index += 1;
            self.deal();
        } else {
            self.completed = true;
            tracing::info!(
                correct = self.correct_count,
                wrong = self.wrong_count,
                "choice completed"
            );
        }
    }
}

impl<R: Rng> Drill for ChoiceSession<R> {
    fn name(&self) -> &'static str {
        "choice"
    }

    fn on_timer(&mut self, timer: TimerId) -> Vec<Effect> {
        if self.advance.fire(timer) && !self.completed {
            self.advance_word();
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
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn animals() -> Vec<Word> {
        vec![
            Word::new("1", "cat", "猫"),
            Word::new("2", "dog", "狗"),
            Word::new("3", "cow", "牛"),
            Word::new("4", "pig", "猪"),
            Word::new("5", "hen", "母鸡"),
            Word::new("6", "ox", "牛"),
        ]
    }

    fn session(words: Vec<Word>, seed: u64) -> ChoiceSession<ChaCha8Rng> {
        ChoiceSession::new(words, ChoiceConfig::default(), ChaCha8Rng::seed_from_u64(seed))
    }

    fn timer_of(effects: &[Effect]) -> TimerId {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::StartTimer { timer, .. } => Some(*timer),
                _ => None,
            })
            .expect("advance timer")
    }

    fn wrong_option(s: &ChoiceSession<ChaCha8Rng>) -> usize {
        let correct = s.correct_option().unwrap();
        (0..s.options().len()).find(|i| *i != correct).unwrap()
    }

    #[test]
    fn four_distinct_options_with_one_correct() {
        let words = animals();
        for seed in 0..20 {
            for index in 0..words.len() {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let options = build_options(&words, index, 3, &mut rng);
                assert_eq!(options.len(), 4);
                assert_eq!(options.iter().filter(|o| **o == words[index].cn).count(), 1);
                let distinct: HashSet<_> = options.iter().collect();
                assert_eq!(distinct.len(), 4);
            }
        }
    }

    #[test]
    fn small_pool_degrades_gracefully() {
        let words = vec![Word::new("1", "cat", "猫"), Word::new("2", "dog", "狗")];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut options = build_options(&words, 0, 3, &mut rng);
        options.sort();
        assert_eq!(options, vec!["狗".to_string(), "猫".to_string()]);

        let single = vec![Word::new("1", "cat", "猫")];
        assert_eq!(build_options(&single, 0, 3, &mut rng), vec!["猫".to_string()]);
        assert!(build_options(&[], 0, 3, &mut rng).is_empty());
    }

    #[test]
    fn same_seed_same_options() {
        let a = session(animals(), 42);
        let b = session(animals(), 42);
        assert_eq!(a.options(), b.options());
    }

    #[test]
    fn correct_pick_advances_after_delay() {
        let mut s = session(animals(), 1);
        let effects = s.select(s.correct_option().unwrap());
        assert!(effects.contains(&Effect::Speak {
            text: "cat".into(),
            ticket: None
        }));
        assert_eq!(s.stats(), SessionStats::from_counts(1, 0));
        assert_eq!(s.index(), 0);

        s.on_timer(timer_of(&effects));
        assert_eq!(s.index(), 1);
        assert_eq!(s.selected(), None);
        assert_eq!(s.current().unwrap().en, "dog");
    }

    #[test]
    fn second_pick_is_ignored_while_pending() {
        let mut s = session(animals(), 2);
        let wrong = wrong_option(&s);
        s.select(wrong);
        assert!(s.select(s.correct_option().unwrap()).is_empty());
        assert_eq!(s.results().len(), 1);
        assert_eq!(s.stats(), SessionStats::from_counts(0, 1));
    }

    #[test]
    fn wrong_pick_stars_word() {
        let mut s = session(animals(), 3);
        let wrong = wrong_option(&s);
        let effects = s.select(wrong);
        assert!(s.is_starred("1"));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Sync { update, .. } if update.word_id == "1" && update.is_starred == Some(true)
        )));

        let summary = s.summary();
        assert_eq!(summary.missed.len(), 1);
        assert_eq!(summary.missed[0].user_answer.as_ref(), Some(&s.options()[wrong]));
        assert!(summary.missed[0].starred);
    }

    #[test]
    fn out_of_range_pick_is_ignored() {
        let mut s = session(animals(), 4);
        assert!(s.select(9).is_empty());
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn completes_at_last_word() {
        let words = vec![Word::new("1", "cat", "猫"), Word::new("2", "dog", "狗")];
        let mut s = session(words, 5);
        for _ in 0..2 {
            let effects = s.select(s.correct_option().unwrap());
            s.on_timer(timer_of(&effects));
        }
        assert!(s.is_completed());
        assert_eq!(s.stats().accuracy, 100);
        assert!(s.select(0).is_empty());
    }

    #[test]
    fn end_early_and_restart() {
        let mut s = session(animals(), 6);
        let timer = timer_of(&s.select(wrong_option(&s)));
        assert_eq!(s.end_early(), vec![Effect::CancelTimer { timer }]);
        assert!(s.is_completed());
        s.on_timer(timer);
        assert_eq!(s.index(), 0);

        s.restart();
        assert!(!s.is_completed());
        assert!(s.results().is_empty());
        assert_eq!(s.stats(), SessionStats::default());
        assert_eq!(s.options().len(), 4);
        assert!(!s.current().unwrap().is_starred);
    }

    #[test]
    fn summary_toggle_rolls_back_on_failure() {
        let mut s = session(animals(), 8);
        s.select(wrong_option(&s));
        let effects = s.toggle_star("1");
        assert!(!s.is_starred("1"));
        let mutation = match &effects[0] {
            Effect::Sync { mutation, .. } => *mutation,
            other => panic!("unexpected {:?}", other),
        };
        s.on_sync_result(mutation, SyncOutcome::Failed("offline".into()));
        assert!(s.is_starred("1"));
    }
}
