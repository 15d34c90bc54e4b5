//! Word list preparation: status overlay, sorting and chunking into study lists.

use crate::config::CHUNK_SIZE;
use crate::error::{CoreError, Result};
use crate::types::{BookProgress, SortMode, StudyStatus, Word};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A fixed-size slice of a book, studied as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyList {
    /// 1-based position of the list within the book.
    pub number: usize,
    pub words: Vec<Word>,
}

impl StudyList {
    /// First `n` spellings, for list previews.
    pub fn preview(&self, n: usize) -> Vec<&str> {
        self.words.iter().take(n).map(|w| w.en.as_str()).collect()
    }
}

/// Overlay study status onto raw words.
///
/// Words without a status entry come out unstarred, unlearned and without a note.
pub fn merge_status(words: Vec<Word>, statuses: &[StudyStatus]) -> Vec<Word> {
    let by_id: HashMap<&str, &StudyStatus> =
        statuses.iter().map(|s| (s.word_id.as_str(), s)).collect();

    words
        .into_iter()
        .map(|mut word| {
            match by_id.get(word.id.as_str()) {
                Some(status) => {
                    word.is_starred = status.is_starred;
                    word.is_learned = status.is_learned;
                    word.note = status.learning_notes.clone();
                }
                None => {
                    word.is_starred = false;
                    word.is_learned = false;
                    word.note = None;
                }
            }
            word
        })
        .collect()
}

/// Sort words in place. Both modes are stable.
pub fn sort_words(words: &mut [Word], mode: SortMode) {
    match mode {
        SortMode::Original => {}
        SortMode::Alphabetical => words.sort_by_cached_key(|w| collation_key(&w.en)),
    }
}

/// Ordering key approximating a locale-aware comparison: letters first,
/// ignoring accents and case; then accents (unaccented first); then case
/// (lowercase first).
fn collation_key(s: &str) -> (String, String, Vec<bool>) {
    let decomposed: String = s.nfd().collect();
    let primary = decomposed
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    let secondary = decomposed.chars().flat_map(char::to_lowercase).collect();
    let tertiary = decomposed.chars().map(char::is_uppercase).collect();
    (primary, secondary, tertiary)
}

/// Split words into consecutive lists of `size`; the last may be shorter.
pub fn chunk(words: &[Word], size: usize) -> Vec<StudyList> {
    let size = size.max(1);
    words
        .chunks(size)
        .enumerate()
        .map(|(idx, chunk)| StudyList {
            number: idx + 1,
            words: chunk.to_vec(),
        })
        .collect()
}

/// Holds a book's merged words and the study lists derived from them.
///
/// Lists are recomputed whenever the words or the sort mode change.
#[derive(Debug, Clone)]
pub struct WordListPreparer {
    source: Vec<Word>,
    sort_mode: SortMode,
    chunk_size: usize,
    sorted: Vec<Word>,
    lists: Vec<StudyList>,
}

impl Default for WordListPreparer {
    fn default() -> Self {
        Self::new(Vec::new(), &[])
    }
}

impl WordListPreparer {
    pub fn new(words: Vec<Word>, statuses: &[StudyStatus]) -> Self {
        Self::with_chunk_size(words, statuses, CHUNK_SIZE)
    }

    pub fn with_chunk_size(words: Vec<Word>, statuses: &[StudyStatus], chunk_size: usize) -> Self {
        let mut preparer = Self {
            source: merge_status(words, statuses),
            sort_mode: SortMode::Original,
            chunk_size,
            sorted: Vec::new(),
            lists: Vec::new(),
        };
        preparer.rebuild();
        preparer
    }

    /// Replace the book's words, e.g. after a reload.
    pub fn set_words(&mut self, words: Vec<Word>, statuses: &[StudyStatus]) {
        self.source = merge_status(words, statuses);
        self.rebuild();
    }

    /// Re-overlay fresh status onto the current words.
    pub fn apply_status(&mut self, statuses: &[StudyStatus]) {
        let words = std::mem::take(&mut self.source);
        self.set_words(words, statuses);
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        if self.sort_mode != mode {
            self.sort_mode = mode;
            self.rebuild();
        }
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// All words in the current order.
    pub fn words(&self) -> &[Word] {
        &self.sorted
    }

    pub fn lists(&self) -> &[StudyList] {
        &self.lists
    }

    pub fn list(&self, number: usize) -> Result<&StudyList> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lists.get(idx))
            .ok_or(CoreError::UnknownList {
                number,
                available: self.lists.len(),
            })
    }

    pub fn progress(&self) -> BookProgress {
        BookProgress::from_words(&self.source)
    }

    /// Apply a local change to a word everywhere it is held.
    pub fn update_word(&mut self, word_id: &str, f: impl Fn(&mut Word)) -> Result<()> {
        let word = self
            .source
            .iter_mut()
            .find(|w| w.id == word_id)
            .ok_or_else(|| CoreError::UnknownWord(word_id.to_string()))?;
        f(word);
        self.rebuild();
        Ok(())
    }

    /// Apply one local change to several words and rebuild the lists once.
    ///
    /// Returns how many words were changed; unknown ids are skipped.
    pub fn update_words<'a, I>(&mut self, word_ids: I, f: impl Fn(&mut Word)) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids: HashSet<&str> = word_ids.into_iter().collect();
        let mut changed = 0;
        for word in self.source.iter_mut().filter(|w| ids.contains(w.id.as_str())) {
            f(word);
            changed += 1;
        }
        if changed > 0 {
            self.rebuild();
        }
        changed
    }

    fn rebuild(&mut self) {
        let mut sorted = self.source.clone();
        sort_words(&mut sorted, self.sort_mode);
        self.lists = chunk(&sorted, self.chunk_size);
        self.sorted = sorted;
        tracing::debug!(
            words = self.sorted.len(),
            lists = self.lists.len(),
            sort_mode = ?self.sort_mode,
            "rebuilt study lists"
        );
    }
}
