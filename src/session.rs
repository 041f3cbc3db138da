/// Session persistence: who is signed in, and the reusable anonymous identity
///
/// The anonymous owner is created once and kept even while a registered user
/// is signed in, so logging out and starting an anonymous session again
/// returns to the same diary.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Owner;
use crate::storage::StorageError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The owner all operations currently act for
    pub current_owner: Option<Owner>,
    pub anonymous_owner: Option<Owner>,
    /// When the anonymous identity was first created
    pub anonymous_started_at: Option<DateTime<Utc>>,
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<SessionState, StorageError>;
    fn save(&self, state: &SessionState) -> Result<(), StorageError>;
}

/// Session kept as a JSON file
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    /// A missing file is an empty session
    fn load(&self) -> Result<SessionState, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &SessionState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(state)?)?;
        Ok(())
    }
}

/// Session held in memory only
#[derive(Default)]
pub struct MemorySessionStore {
    state: Mutex<SessionState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionState, StorageError> {
        self.state
            .lock()
            .map(|s| s.clone())
            .map_err(|_| StorageError::Connection("session lock poisoned".to_string()))
    }

    fn save(&self, state: &SessionState) -> Result<(), StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| StorageError::Connection("session lock poisoned".to_string()))?;
        *guard = state.clone();
        Ok(())
    }
}
