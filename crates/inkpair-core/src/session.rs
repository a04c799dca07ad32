//! Session identity.
//!
//! A session id is the sole rendezvous address between the capture and
//! render devices: generated once per installation, persisted locally, and
//! shared with the second device via a pairing URL (usually as a QR code).

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Query parameter carrying the session id in a pairing URL.
const SESSION_PARAM: &str = "session";

/// Storage key under which the id is persisted.
pub const SESSION_ID_KEY: &str = "session_id";

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

pub type SessionStoreResult<T> = Result<T, SessionStoreError>;

/// One-string-key persistent storage for the session id.
pub trait SessionStore {
    /// Read a stored value, `None` if absent.
    fn load(&self, key: &str) -> SessionStoreResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn store(&self, key: &str, value: &str) -> SessionStoreResult<()>;
}

/// In-memory store for tests and ephemeral use.
#[derive(Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> SessionStoreResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| SessionStoreError::Other(format!("Lock error: {}", e)))?;
        Ok(values.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> SessionStoreResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| SessionStoreError::Other(format!("Lock error: {}", e)))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: one small file per key under the user config dir.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileSessionStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSessionStore {
    /// Store under `<config-dir>/inkpair`.
    pub fn new() -> Option<Self> {
        let dir = dirs::config_dir()?.join("inkpair");
        Some(Self { dir })
    }

    pub fn with_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(key)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SessionStore for FileSessionStore {
    fn load(&self, key: &str) -> SessionStoreResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionStoreError::Io(e.to_string())),
        }
    }

    fn store(&self, key: &str, value: &str) -> SessionStoreResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SessionStoreError::Io(e.to_string()))?;
        std::fs::write(self.path_for(key), value).map_err(|e| SessionStoreError::Io(e.to_string()))
    }
}

/// The session identity a device uses to rendezvous with its partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
}

impl Session {
    /// Load the persisted session id or generate and persist a fresh one.
    ///
    /// Idempotent per store: repeated calls return the identical id. A
    /// stored value that does not parse as a UUID is replaced.
    pub fn ensure(store: &dyn SessionStore) -> SessionStoreResult<Self> {
        if let Some(raw) = store.load(SESSION_ID_KEY)? {
            if let Ok(id) = Uuid::parse_str(&raw) {
                return Ok(Self { id });
            }
            log::warn!("Discarding unparsable stored session id");
        }
        let id = Uuid::new_v4();
        store.store(SESSION_ID_KEY, &id.to_string())?;
        Ok(Self { id })
    }

    /// Adopt an id received from a partner device (e.g. a scanned QR code).
    pub fn from_id(id: Uuid) -> Self {
        Self { id }
    }

    /// Build the URL the second device opens to join this session.
    pub fn pairing_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.query_pairs_mut()
            .append_pair(SESSION_PARAM, &self.id.to_string());
        url
    }

    /// Extract a session from a pairing URL, if it carries a valid id.
    pub fn from_pairing_url(url: &Url) -> Option<Self> {
        let (_, raw) = url.query_pairs().find(|(k, _)| k == SESSION_PARAM)?;
        Uuid::parse_str(&raw).ok().map(Self::from_id)
    }
}
