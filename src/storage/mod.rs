//! Durable client-side credential storage
//!
//! The portal persists exactly two values across restarts: the bearer token
//! and an optional remembered login email. The store is injected into the
//! session layer so tests can run against the in-memory variant.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt state file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable key-value storage for the session credential.
///
/// Reads are infallible: a missing or unreadable value behaves as absent.
pub trait CredentialStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str) -> Result<(), StorageError>;
    fn clear_token(&self) -> Result<(), StorageError>;

    fn remembered_email(&self) -> Option<String>;
    fn set_remembered_email(&self, email: &str) -> Result<(), StorageError>;
    fn clear_remembered_email(&self) -> Result<(), StorageError>;
}

/// Persisted state file contents
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct PersistedState {
    token: Option<String>,
    #[serde(rename = "rememberedEmail")]
    remembered_email: Option<String>,
}

/// In-memory store for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<PersistedState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn token(&self) -> Option<String> {
        self.state.lock().unwrap().token.clone()
    }

    fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.state.lock().unwrap().token = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), StorageError> {
        self.state.lock().unwrap().token = None;
        Ok(())
    }

    fn remembered_email(&self) -> Option<String> {
        self.state.lock().unwrap().remembered_email.clone()
    }

    fn set_remembered_email(&self, email: &str) -> Result<(), StorageError> {
        self.state.lock().unwrap().remembered_email = Some(email.to_string());
        Ok(())
    }

    fn clear_remembered_email(&self) -> Result<(), StorageError> {
        self.state.lock().unwrap().remembered_email = None;
        Ok(())
    }
}

/// JSON-file-backed store that survives process restarts
pub struct FileStore {
    path: PathBuf,
    state: Mutex<PersistedState>,
}

impl FileStore {
    /// Open or create a store at the given path.
    ///
    /// A corrupt state file is treated as empty rather than fatal; the user
    /// re-authenticates instead of being locked out of the app.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt state file");
                    PersistedState::default()
                }
            },
            Err(_) => PersistedState::default(),
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn persist(&self, state: &PersistedState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut PersistedState),
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock().unwrap();
        apply(&mut state);
        self.persist(&state)
    }
}

impl CredentialStore for FileStore {
    fn token(&self) -> Option<String> {
        self.state.lock().unwrap().token.clone()
    }

    fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.update(|s| s.token = Some(token.to_string()))
    }

    fn clear_token(&self) -> Result<(), StorageError> {
        self.update(|s| s.token = None)
    }

    fn remembered_email(&self) -> Option<String> {
        self.state.lock().unwrap().remembered_email.clone()
    }

    fn set_remembered_email(&self, email: &str) -> Result<(), StorageError> {
        self.update(|s| s.remembered_email = Some(email.to_string()))
    }

    fn clear_remembered_email(&self) -> Result<(), StorageError> {
        self.update(|s| s.remembered_email = None)
    }
}
