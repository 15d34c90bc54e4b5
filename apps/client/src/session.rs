//! Persisted login session.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The logged-in user as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub token: String,
    pub username: String,
    pub user_id: i64,
}

/// Storage for the current session.
pub trait SessionStore: Send + Sync {
    fn get_token(&self) -> Option<String> {
        self.user().map(|u| u.token)
    }

    fn user(&self) -> Option<UserSession>;

    fn set_user(&self, session: UserSession) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Session held in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    current: Mutex<Option<UserSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(session: UserSession) -> Self {
        Self {
            current: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn user(&self) -> Option<UserSession> {
        self.current.lock().expect("session lock").clone()
    }

    fn set_user(&self, session: UserSession) -> Result<()> {
        *self.current.lock().expect("session lock") = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.current.lock().expect("session lock") = None;
        Ok(())
    }
}

/// Session persisted as JSON, cached in memory after the first read.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    current: Mutex<Option<UserSession>>,
}

impl FileSessionStore {
    /// Open the store. A missing file means logged out; an unreadable one is
    /// discarded.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match read_session(&path) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding stored session");
                if let Err(e) = std::fs::remove_file(&path) {
                    tracing::debug!(error = %e, "could not remove session file");
                }
                None
            }
        };
        Self {
            path,
            current: Mutex::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_session(path: &Path) -> Result<Option<UserSession>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ClientError::Session(e.to_string())),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ClientError::Session(e.to_string()))
}

impl SessionStore for FileSessionStore {
    fn user(&self) -> Option<UserSession> {
        self.current.lock().expect("session lock").clone()
    }

    fn set_user(&self, session: UserSession) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| ClientError::Session(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&session)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| ClientError::Session(e.to_string()))?;
        tracing::info!(username = %session.username, "session stored");
        *self.current.lock().expect("session lock") = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.current.lock().expect("session lock") = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(e.to_string())),
        }
    }
}
