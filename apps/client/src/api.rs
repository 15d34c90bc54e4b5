//! Wire types of the word repository HTTP API.
//!
//! Every endpoint answers with an [`Envelope`]. Word ids arrive either as
//! numbers or as strings and are normalised to strings; outgoing status
//! updates carry integer ids.

use crate::error::{ClientError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use wordbook_core::{StatusUpdate, StudyStatus, Word};

/// Envelope code for success.
pub const CODE_OK: i64 = 200;
/// Envelope code for an expired or missing token.
pub const CODE_UNAUTHORIZED: i64 = 401;

/// Categories shown when the repository cannot be reached.
pub const BUILTIN_CATEGORIES: [&str; 6] =
    ["四级", "六级", "雅思", "托福", "高中", "初中"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub data: Option<T>,
    #[serde(default)]
    pub msg: String,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            data: Some(data),
            msg: "success".to_string(),
        }
    }

    /// Payload of a successful envelope.
    pub fn into_result(self) -> Result<Option<T>> {
        match self.code {
            CODE_OK => Ok(self.data),
            CODE_UNAUTHORIZED => Err(ClientError::Unauthorized),
            code => Err(ClientError::Backend {
                status: u16::try_from(code).unwrap_or(u16::MAX),
                message: self.msg,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(i64),
    Text(String),
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match WireId::deserialize(deserializer)? {
        WireId::Number(n) => n.to_string(),
        WireId::Text(s) => s,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireWord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub english: String,
    pub chinese: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub sentence: Option<String>,
    #[serde(default)]
    pub sentence_translation: Option<String>,
    #[serde(default)]
    pub pos: Option<String>,
}

impl From<WireWord> for Word {
    fn from(w: WireWord) -> Self {
        let mut word = Word::new(w.id, w.english, w.chinese);
        word.phonetic = w.phonetic.unwrap_or_default();
        word.example = w.sentence.filter(|s| !s.is_empty());
        word.example_cn = w.sentence_translation.filter(|s| !s.is_empty());
        word.pos = w.pos.filter(|s| !s.is_empty());
        word
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStudyStatus {
    #[serde(deserialize_with = "id_string")]
    pub word_id: String,
    #[serde(default)]
    pub is_starred: bool,
    #[serde(default)]
    pub is_learned: bool,
    #[serde(default)]
    pub learning_notes: Option<String>,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub incorrect_count: u32,
    #[serde(default)]
    pub learn_create_time: Option<String>,
}

impl From<WireStudyStatus> for StudyStatus {
    fn from(s: WireStudyStatus) -> Self {
        StudyStatus {
            learn_create_time: s.learn_create_time.as_deref().and_then(parse_timestamp),
            word_id: s.word_id,
            is_starred: s.is_starred,
            is_learned: s.is_learned,
            learning_notes: s.learning_notes.filter(|n| !n.is_empty()),
            correct_count: s.correct_count,
            incorrect_count: s.incorrect_count,
        }
    }
}

/// RFC 3339, or `YYYY-MM-DD HH:MM:SS` taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            tracing::debug!(raw, error = %e, "unparseable learn time");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStatusUpdate {
    pub word_id: i64,
    pub update_modules: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_starred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_learned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_notes: Option<String>,
}

/// Encode a batch, skipping words whose id the repository cannot key.
pub fn status_batch(updates: &[StatusUpdate]) -> Vec<WireStatusUpdate> {
    updates
        .iter()
        .filter_map(|u| match u.word_id.parse::<i64>() {
            Ok(word_id) => Some(WireStatusUpdate {
                word_id,
                update_modules: u.modules.iter().map(|m| m.to_value()).collect(),
                is_starred: u.is_starred,
                is_learned: u.is_learned,
                learning_notes: u.learning_notes.clone(),
            }),
            Err(_) => {
                tracing::warn!(word_id = %u.word_id, "skipping status update for non-numeric id");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

pub fn builtin_categories() -> Vec<Category> {
    BUILTIN_CATEGORIES
        .iter()
        .zip(1..)
        .map(|(name, id)| Category {
            id,
            name: name.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub activation_code: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub token: String,
    pub username: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRecordRequest<'a> {
    pub book_id: &'a str,
}
