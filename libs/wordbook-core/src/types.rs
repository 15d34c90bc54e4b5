//! Core types for the vocabulary study application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single vocabulary entry merged with the user's study status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: String,
    /// Target spelling.
    pub en: String,
    /// Translation or definition, possibly prefixed with a part-of-speech tag.
    pub cn: String,
    pub phonetic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_cn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(default)]
    pub is_starred: bool,
    #[serde(default)]
    pub is_learned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Word {
    /// Create a word with only the fields every drill needs.
    pub fn new(id: impl Into<String>, en: impl Into<String>, cn: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            en: en.into(),
            cn: cn.into(),
            phonetic: String::new(),
            example: None,
            example_cn: None,
            pos: None,
            is_starred: false,
            is_learned: false,
            note: None,
        }
    }

    /// Definition with any leading part-of-speech tag removed.
    pub fn definition(&self) -> &str {
        split_part_of_speech(&self.cn).1
    }
}

/// Per-user study status for a word, as kept by the word repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStatus {
    pub word_id: String,
    pub is_starred: bool,
    pub is_learned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_notes: Option<String>,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub incorrect_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learn_create_time: Option<DateTime<Utc>>,
}

/// Ordering applied to a book's words before chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    Original,
    Alphabetical,
}

impl Default for SortMode {
    fn default() -> Self {
        Self::Original
    }
}

/// One answer given in a dictation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub word_id: String,
    pub is_correct: bool,
    pub user_answer: String,
}

/// Which half of a pair a match tile shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSide {
    /// The English spelling.
    Source,
    /// The translation.
    Target,
}

impl TileSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

/// A face-up tile in the match game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// `"<side>-<word id>"`, unique within a game.
    pub id: String,
    pub text: String,
    pub word_id: String,
    pub side: TileSide,
    pub matched: bool,
}

impl Tile {
    pub fn new(side: TileSide, word: &Word) -> Self {
        let text = match side {
            TileSide::Source => word.en.clone(),
            TileSide::Target => word.definition().to_string(),
        };
        Self {
            id: format!("{}-{}", side.as_str(), word.id),
            text,
            word_id: word.id.clone(),
            side,
            matched: false,
        }
    }
}

/// Number of pairs dealt in a match game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairCount {
    Six,
    Ten,
}

impl Default for PairCount {
    fn default() -> Self {
        Self::Ten
    }
}

impl PairCount {
    pub fn to_value(self) -> usize {
        match self {
            Self::Six => 6,
            Self::Ten => 10,
        }
    }

    pub fn from_value(value: usize) -> Option<Self> {
        match value {
            6 => Some(Self::Six),
            10 => Some(Self::Ten),
            _ => None,
        }
    }
}

/// Which status field an update carries.
///
/// The numeric values are the repository's module codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateModule {
    Learned,
    Starred,
    Notes,
}

impl UpdateModule {
    pub fn to_value(self) -> u8 {
        match self {
            Self::Learned => 1,
            Self::Starred => 2,
            Self::Notes => 3,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Learned),
            2 => Some(Self::Starred),
            3 => Some(Self::Notes),
            _ => None,
        }
    }
}

/// One element of a status update batch.
///
/// Only the fields named in `modules` are authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub word_id: String,
    pub modules: Vec<UpdateModule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_starred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_learned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_notes: Option<String>,
}

impl StatusUpdate {
    pub fn learned(word_id: impl Into<String>) -> Self {
        Self {
            word_id: word_id.into(),
            modules: vec![UpdateModule::Learned],
            is_starred: None,
            is_learned: Some(true),
            learning_notes: None,
        }
    }

    pub fn starred(word_id: impl Into<String>, starred: bool) -> Self {
        Self {
            word_id: word_id.into(),
            modules: vec![UpdateModule::Starred],
            is_starred: Some(starred),
            is_learned: None,
            learning_notes: None,
        }
    }

    pub fn notes(word_id: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            word_id: word_id.into(),
            modules: vec![UpdateModule::Notes],
            is_starred: None,
            is_learned: None,
            learning_notes: Some(notes.into()),
        }
    }
}

/// Learned and starred totals for a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookProgress {
    pub total: usize,
    pub learned: usize,
    pub starred: usize,
}

impl BookProgress {
    pub fn from_words(words: &[Word]) -> Self {
        Self {
            total: words.len(),
            learned: words.iter().filter(|w| w.is_learned).count(),
            starred: words.iter().filter(|w| w.is_starred).count(),
        }
    }
}

/// Split a leading part-of-speech tag such as `"adj."` off a definition.
///
/// The tag is a run of lowercase ASCII letters ending in a dot and followed by
/// whitespace. Returns the definition unchanged if there is no such tag.
pub fn split_part_of_speech(cn: &str) -> (Option<&str>, &str) {
    let letters = cn.bytes().take_while(u8::is_ascii_lowercase).count();
    if letters == 0 || cn.as_bytes().get(letters) != Some(&b'.') {
        return (None, cn);
    }
    let (tag, rest) = cn.split_at(letters + 1);
    let definition = rest.trim_start();
    if definition.len() == rest.len() || definition.is_empty() {
        return (None, cn);
    }
    (Some(tag), definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_leading_tag() {
        assert_eq!(split_part_of_speech("v. 放弃，遗弃"), (Some("v."), "放弃，遗弃"));
        assert_eq!(
            split_part_of_speech("adj. 抽象的 n. 摘要"),
            (Some("adj."), "抽象的 n. 摘要")
        );
    }

    #[test]
    fn keeps_untagged_definitions() {
        assert_eq!(split_part_of_speech("猫"), (None, "猫"));
        assert_eq!(split_part_of_speech("v./n. 滥用"), (None, "v./n. 滥用"));
        assert_eq!(split_part_of_speech("v.放弃"), (None, "v.放弃"));
        assert_eq!(split_part_of_speech("n. "), (None, "n. "));
    }

    #[test]
    fn target_tile_drops_tag() {
        let word = Word::new("7", "abandon", "v. 放弃");
        let tile = Tile::new(TileSide::Target, &word);
        assert_eq!(tile.id, "target-7");
        assert_eq!(tile.text, "放弃");
        assert!(!tile.matched);

        let tile = Tile::new(TileSide::Source, &word);
        assert_eq!(tile.id, "source-7");
        assert_eq!(tile.text, "abandon");
    }

    #[test]
    fn word_flags_default_when_absent() {
        let word: Word = serde_json::from_str(
            r#"{"id":"1","en":"cat","cn":"n. 猫","phonetic":"/kæt/"}"#,
        )
        .unwrap();
        assert!(!word.is_starred);
        assert!(!word.is_learned);
        assert_eq!(word.note, None);
        assert_eq!(word.definition(), "猫");
    }

    #[test]
    fn module_codes() {
        for module in [UpdateModule::Learned, UpdateModule::Starred, UpdateModule::Notes] {
            assert_eq!(UpdateModule::from_value(module.to_value()), Some(module));
        }
        assert_eq!(UpdateModule::Starred.to_value(), 2);
        assert_eq!(UpdateModule::from_value(4), None);
    }

    #[test]
    fn pair_count_values() {
        assert_eq!(PairCount::default().to_value(), 10);
        assert_eq!(PairCount::from_value(6), Some(PairCount::Six));
        assert_eq!(PairCount::from_value(8), None);
    }

    #[test]
    fn progress_counts_flags() {
        let mut a = Word::new("1", "a", "x");
        a.is_learned = true;
        let mut b = Word::new("2", "b", "y");
        b.is_starred = true;
        b.is_learned = true;
        let progress = BookProgress::from_words(&[a, b, Word::new("3", "c", "z")]);
        assert_eq!(progress, BookProgress { total: 3, learned: 2, starred: 1 });
    }
}
