//! Key/value secure storage for the API credential and theme preference
//!
//! This module provides:
//! - The `SecureStore` trait the session and theme code depend on
//! - `MemoryStore` for tests and platforms without a keychain
//! - `FileStore`, a per-key file backend with owner-only permissions

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Store key for the Gemini API credential.
pub const API_KEY_KEY: &str = "gemini_api_key";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("refusing to store an empty value for {0}")]
    EmptyValue(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String values under string keys.
///
/// Keys are arbitrary; distinct keys never share an entry.
pub trait SecureStore: Send + Sync {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
}

// ============================================
// In-memory backend
// ============================================

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecureStore for MemoryStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let items = self.items.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut items = self.items.lock().map_err(|_| StoreError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================
// File backend (native platforms)
// ============================================

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted in the platform's local data directory.
    pub fn in_default_location() -> Self {
        Self::new(default_store_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.secret", sanitize_key(key)))
    }
}

pub fn default_store_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("gemini-chat").join("secure");
    }

    PathBuf::from("cache").join("secure")
}

impl SecureStore for FileStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.item_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Write to an owner-only staging file, then rename it over the item.
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.item_path(key);
        let staging = path.with_extension("secret.tmp");

        if let Err(source) = write_owner_only(&staging, value.as_bytes()) {
            let _ = fs::remove_file(&staging);
            return Err(StoreError::Io {
                path: staging,
                source,
            });
        }
        fs::rename(&staging, &path).map_err(|source| StoreError::Io { path, source })
    }
}

/// Create `path` fresh with mode 0600 on unix, so the contents are never
/// visible to other users.
fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    // A leftover staging file would keep its old mode.
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// File-name-safe encoding of a storage key.
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes
/// `%XX`. The mapping is injective, so distinct keys get distinct files.
fn sanitize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

// ============================================
// Credential helpers
// ============================================

/// Stored API key, or `None` when absent, blank or unreadable.
pub fn load_credential(store: &dyn SecureStore) -> Option<String> {
    match store.get_item(API_KEY_KEY) {
        Ok(value) => value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        Err(err) => {
            tracing::error!(error = %err, "failed to read stored API key");
            None
        }
    }
}

/// Persist the API key and return the trimmed value that was stored.
pub fn save_credential(store: &dyn SecureStore, value: &str) -> StoreResult<String> {
    let key = value.trim();
    if key.is_empty() {
        return Err(StoreError::EmptyValue(API_KEY_KEY.to_string()));
    }
    store.set_item(API_KEY_KEY, key)?;
    tracing::info!("API key saved");
    Ok(key.to_string())
}
