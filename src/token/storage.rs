//! Credential Storage
//!
//! Persistence for the credential record. A save always replaces the whole
//! record so readers never observe half of a token pair.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{BullhornError, StorageError};
use crate::types::Credential;

/// Credential storage interface.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the credential, failing if any static field is missing.
    async fn load(&self) -> Result<Credential, BullhornError>;

    /// Persist the full credential.
    async fn save(&self, credential: &Credential) -> Result<(), BullhornError>;
}

/// JSON file credential store.
///
/// Saves go through a temporary file in the same directory followed by a
/// rename, so concurrent sessions sharing one file never interleave writes.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), BullhornError> {
        let write_failed = |message: String| {
            BullhornError::Storage(StorageError::WriteFailed {
                path: path.display().to_string(),
                message,
            })
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut file =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| write_failed(e.to_string()))?;
        file.write_all(contents)
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| write_failed(e.to_string()))?;
        file.persist(path)
            .map_err(|e| write_failed(e.error.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Credential, BullhornError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            BullhornError::Storage(StorageError::ReadFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })
        })?;

        let credential: Credential = serde_json::from_str(&contents).map_err(|e| {
            BullhornError::Storage(StorageError::CorruptedData {
                message: format!("{}: {}", self.path.display(), e),
            })
        })?;

        credential.validate()?;
        tracing::debug!(
            path = %self.path.display(),
            state = ?credential.state(),
            "Loaded credential"
        );
        Ok(credential)
    }

    async fn save(&self, credential: &Credential) -> Result<(), BullhornError> {
        let contents = serde_json::to_vec_pretty(credential).map_err(|e| {
            BullhornError::Storage(StorageError::WriteFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })
        })?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::write_atomic(&path, &contents))
            .await
            .map_err(|e| {
                BullhornError::Storage(StorageError::WriteFailed {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                })
            })??;

        tracing::debug!(path = %self.path.display(), "Saved credential");
        Ok(())
    }
}

/// In-memory credential store.
pub struct InMemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl InMemoryCredentialStore {
    /// Create a store holding `credential`.
    pub fn new(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }

    /// Create an empty store.
    pub fn empty() -> Self {
        Self {
            credential: Mutex::new(None),
        }
    }

    /// Current stored credential.
    pub fn current(&self) -> Option<Credential> {
        self.credential.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Credential, BullhornError> {
        let credential = self.current().ok_or_else(|| {
            BullhornError::Storage(StorageError::ReadFailed {
                path: "memory".to_string(),
                message: "no credential stored".to_string(),
            })
        })?;
        credential.validate()?;
        Ok(credential)
    }

    async fn save(&self, credential: &Credential) -> Result<(), BullhornError> {
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }
}

/// Mock credential store for testing.
#[derive(Default)]
pub struct MockCredentialStore {
    credential: Mutex<Option<Credential>>,
    save_history: Mutex<Vec<Credential>>,
    load_count: Mutex<usize>,
    should_fail: Mutex<bool>,
}

impl MockCredentialStore {
    /// Create new mock credential store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the credential returned by `load`.
    pub fn with_credential(credential: Credential) -> Self {
        let store = Self::default();
        *store.credential.lock().unwrap() = Some(credential);
        store
    }

    /// Set storage to fail all operations.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// Every credential passed to `save`, oldest first.
    pub fn get_save_history(&self) -> Vec<Credential> {
        self.save_history.lock().unwrap().clone()
    }

    /// Number of `save` calls.
    pub fn save_count(&self) -> usize {
        self.save_history.lock().unwrap().len()
    }

    /// Number of `load` calls.
    pub fn load_count(&self) -> usize {
        *self.load_count.lock().unwrap()
    }

    fn check_error(&self) -> Result<(), BullhornError> {
        if *self.should_fail.lock().unwrap() {
            return Err(BullhornError::Storage(StorageError::WriteFailed {
                path: "mock".to_string(),
                message: "Mock storage failure".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn load(&self) -> Result<Credential, BullhornError> {
        self.check_error()?;
        *self.load_count.lock().unwrap() += 1;
        let credential = self.credential.lock().unwrap().clone().ok_or_else(|| {
            BullhornError::Storage(StorageError::ReadFailed {
                path: "mock".to_string(),
                message: "no credential stored".to_string(),
            })
        })?;
        credential.validate()?;
        Ok(credential)
    }

    async fn save(&self, credential: &Credential) -> Result<(), BullhornError> {
        self.check_error()?;
        self.save_history.lock().unwrap().push(credential.clone());
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }
}
