//! Ephemeral session flag.
//!
//! The session lives outside the durable store: it says that the PIN of one
//! registered profile was entered recently, nothing more. Each session records
//! the owner key of that profile and only counts as active for the same key.
//! [`MemorySession`] lasts as long as the process, [`FileSession`] survives
//! between command invocations until it expires.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Marks the session as active for `owner`, replacing any other session.
    fn start(&self, owner: &str) -> ResultEngine<()>;
    /// Removes the session flag. Clearing an absent session is not an error.
    fn clear(&self) -> ResultEngine<()>;
    /// `true` only for a live session started for `owner`.
    fn is_active(&self, owner: &str) -> ResultEngine<bool>;
}

#[derive(Debug, Default)]
pub struct MemorySession {
    owner: Mutex<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemorySession {
    fn owner(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySession {
    fn start(&self, owner: &str) -> ResultEngine<()> {
        *self.owner() = Some(owner.to_string());
        Ok(())
    }

    fn clear(&self) -> ResultEngine<()> {
        *self.owner() = None;
        Ok(())
    }

    fn is_active(&self, owner: &str) -> ResultEngine<bool> {
        Ok(self.owner().as_deref() == Some(owner))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SessionState {
    Active,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    state: SessionState,
    owner: String,
    expires_at: DateTime<Utc>,
}

/// Session flag stored in a small JSON file with an expiry.
#[derive(Debug, Clone)]
pub struct FileSession {
    path: PathBuf,
    ttl: Duration,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> ResultEngine<Option<SessionFile>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(EngineError::Session(err)),
        };
        match serde_json::from_str(&content) {
            Ok(file) => Ok(Some(file)),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable session file: {err}");
                Ok(None)
            }
        }
    }
}

impl SessionStore for FileSession {
    fn start(&self, owner: &str) -> ResultEngine<()> {
        let expires_at = Utc::now().checked_add_signed(self.ttl).ok_or_else(|| {
            EngineError::Session(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "session lifetime out of range",
            ))
        })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(EngineError::Session)?;
        }
        let payload = serde_json::to_string(&SessionFile {
            state: SessionState::Active,
            owner: owner.to_string(),
            expires_at,
        })?;
        fs::write(&self.path, payload).map_err(EngineError::Session)?;
        Ok(())
    }

    fn clear(&self) -> ResultEngine<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(EngineError::Session(err)),
        }
    }

    fn is_active(&self, owner: &str) -> ResultEngine<bool> {
        let Some(file) = self.read()? else {
            return Ok(false);
        };
        if file.expires_at <= Utc::now() {
            tracing::debug!("session expired");
            self.clear()?;
            return Ok(false);
        }
        if file.owner != owner {
            tracing::debug!("session belongs to another profile");
            return Ok(false);
        }
        Ok(file.state == SessionState::Active)
    }
}
