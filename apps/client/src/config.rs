//! Client configuration read from the environment.

use crate::error::{ClientError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use wordbook_core::DrillConfig;

pub const DEFAULT_API_URL: &str = "http://ph2.youtongxue.xyz";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Word repository base URL, without a trailing slash.
    pub api_url: String,
    pub http_timeout: Duration,
    /// Where the login session is persisted.
    pub session_file: PathBuf,
    pub drills: DrillConfig,
}

impl ClientConfig {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("WORDBOOK_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = parse_or(
            &lookup,
            "WORDBOOK_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        let session_file = match lookup("WORDBOOK_SESSION_FILE") {
            Some(path) => PathBuf::from(path),
            None => dirs::data_local_dir()
                .map(|dir| dir.join("wordbook").join("session.json"))
                .ok_or_else(|| {
                    ClientError::Config(
                        "no local data directory, set WORDBOOK_SESSION_FILE".to_string(),
                    )
                })?,
        };

        let mut drills = DrillConfig::default();
        drills.dictation.advance_ms = parse_or(
            &lookup,
            "WORDBOOK_DICTATION_ADVANCE_MS",
            drills.dictation.advance_ms,
        )?;
        drills.choice.advance_ms =
            parse_or(&lookup, "WORDBOOK_CHOICE_ADVANCE_MS", drills.choice.advance_ms)?;
        drills.matching.mismatch_ms =
            parse_or(&lookup, "WORDBOOK_MATCH_MISMATCH_MS", drills.matching.mismatch_ms)?;
        drills.flashcard.transition_ms = parse_or(
            &lookup,
            "WORDBOOK_FLASHCARD_TRANSITION_MS",
            drills.flashcard.transition_ms,
        )?;
        drills.flashcard.drag.threshold_px = parse_or(
            &lookup,
            "WORDBOOK_DRAG_THRESHOLD_PX",
            drills.flashcard.drag.threshold_px,
        )?;

        Ok(Self {
            api_url,
            http_timeout: Duration::from_secs(timeout_secs),
            session_file,
            drills,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ClientError::Config(format!("{}={:?}: {}", key, raw, e))),
    }
}
