//! Durable storage for the session record.
//!
//! The record is persisted as a single serialized blob under one key, never
//! as separate token/user-id/username entries, so a crash between writes
//! cannot leave a half-authenticated session behind.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use keyring::Entry;

use super::SessionRecord;

/// Keyring service name for the platform credential store backend
const SERVICE_NAME: &str = "envers-client";

/// Keyring account name under which the session record is stored
const SESSION_ENTRY: &str = "session";

/// Session file name for the file-backed store
const SESSION_FILE: &str = "session.json";

/// Storage backend for the session record.
///
/// Implementations must be durable across process restarts. `load` returns
/// `Ok(None)` when no record has been written, and `clear` is a no-op when
/// nothing is stored.
pub trait CredentialStore {
    fn load(&self) -> Result<Option<SessionRecord>>;
    fn save(&self, record: &SessionRecord) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Session storage in the OS keychain. This is the backend to use in
/// production: the record survives restarts and is not readable by other
/// applications.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a custom keyring service name. Useful when several builds of the
    /// app must not share a session.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, SESSION_ENTRY).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn load(&self) -> Result<Option<SessionRecord>> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(raw) => {
                let record = serde_json::from_str(&raw)
                    .context("Failed to parse stored session record")?;
                Ok(Some(record))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read session from keychain"),
        }
    }

    fn save(&self, record: &SessionRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.entry()?
            .set_password(&raw)
            .context("Failed to store session in keychain")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let entry = self.entry()?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }
}

/// Session storage in a JSON file under the platform data directory.
///
/// Fallback for platforms without a usable keychain. The file is private to
/// the application's data directory but not encrypted.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Place the session file under the platform data directory,
    /// e.g. `~/.local/share/envers-client/session.json`.
    pub fn in_data_dir() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(Self::new(data_dir.join(SERVICE_NAME).join(SESSION_FILE)))
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<Option<SessionRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        let record =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(record))
    }

    fn save(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(record)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// In-memory store for tests and previews. Clones share the same record,
/// which makes it easy to simulate a process restart by handing the same
/// store to a fresh session manager.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Option<SessionRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SessionRecord>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Whether any record is currently stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<SessionRecord>> {
        Ok(self.lock().clone())
    }

    fn save(&self, record: &SessionRecord) -> Result<()> {
        *self.lock() = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock() = None;
        Ok(())
    }
}
