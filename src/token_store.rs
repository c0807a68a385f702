//! Durable storage for the single bearer credential.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session reads this once at start-up and mirrors every login/logout
//! into it, so a restart resumes the previous session. One fixed key, one raw
//! token string, no shape validation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::api::Credential;
use crate::error::StoreError;

#[cfg(test)]
#[path = "token_store_test.rs"]
mod tests;

/// Fixed storage key; doubles as the token file name.
pub const TOKEN_KEY: &str = "token";

pub trait TokenStore: Send + Sync {
    /// Current credential, or `None` when logged out.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    fn get(&self) -> Result<Option<Credential>, StoreError>;

    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written.
    fn set(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Remove the credential. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be modified.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        (**self).get()
    }

    fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        (**self).set(credential)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Token persisted as `<dir>/token`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(TOKEN_KEY) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            // An empty entry reads as logged out.
            Ok(raw) if raw.is_empty() => Ok(None),
            Ok(raw) => Ok(Some(Credential::new(raw))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| self.io_error(e))?;
        std::io::Write::write_all(&mut file, credential.as_str().as_bytes()).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self { slot: Mutex::new(Some(credential)) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn set(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
