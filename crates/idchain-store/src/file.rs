//! File-backed store: one JSON document holding every chain.
//!
//! The document has the shape `{"chains": {"<owner_id>": <chain>, ...}}` and
//! is rewritten in full on every mutation. Commits go through a temporary
//! file in the same directory followed by a rename, so a reader of the path
//! only ever sees a complete document.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use idchain_core::IdentityChain;

use crate::error::{Result, StoreError};
use crate::traits::ChainStore;

/// Configuration for [`FileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStoreConfig {
    /// Location of the JSON document.
    pub path: PathBuf,

    /// Flush the temporary file to stable storage before renaming it.
    pub durable_commit: bool,
}

impl FileStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            durable_commit: false,
        }
    }

    pub fn with_durable_commit(mut self, durable_commit: bool) -> Self {
        self.durable_commit = durable_commit;
        self
    }
}

#[derive(Deserialize)]
struct StoreDocument {
    #[serde(default)]
    chains: Option<BTreeMap<String, IdentityChain>>,
}

#[derive(Serialize)]
struct StoreDocumentRef<'a> {
    chains: &'a BTreeMap<String, IdentityChain>,
}

type Chains = BTreeMap<String, IdentityChain>;

/// Durable chain store backed by a single JSON file.
///
/// The whole key space sits behind one lock. Reads share it; mutations hold
/// it exclusively for the duration of the commit.
#[derive(Debug)]
pub struct FileStore {
    config: FileStoreConfig,
    chains: RwLock<Chains>,
}

impl FileStore {
    /// Open the store at `path` with default settings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(FileStoreConfig::new(path))
    }

    /// Open the store described by `config`.
    ///
    /// A missing or empty file yields an empty store. Nothing is written
    /// until the first mutation.
    pub fn open_with(config: FileStoreConfig) -> Result<Self> {
        let chains = load(&config.path)?;
        tracing::info!(
            path = %config.path.display(),
            chains = chains.len(),
            "opened chain store"
        );
        Ok(Self {
            config,
            chains: RwLock::new(chains),
        })
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &FileStoreConfig {
        &self.config
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Chains>> {
        self.chains.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Chains>> {
        self.chains.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Write `chains` to a sibling temp file and rename it over the document.
    fn commit(&self, chains: &Chains) -> Result<()> {
        let dir = parent_dir(&self.config.path);
        fs::create_dir_all(&dir)?;

        let bytes = serde_json::to_vec_pretty(&StoreDocumentRef { chains })?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        if self.config.durable_commit {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&self.config.path)
            .map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!(
            path = %self.config.path.display(),
            chains = chains.len(),
            bytes = bytes.len(),
            durable = self.config.durable_commit,
            "committed chain store"
        );
        Ok(())
    }
}

impl ChainStore for FileStore {
    fn create(&self, chain: &IdentityChain) -> Result<()> {
        if chain.owner_id.is_empty() {
            return Err(StoreError::InvalidInput("owner_id is required".into()));
        }
        let mut chains = self.write()?;
        if chains.contains_key(&chain.owner_id) {
            return Err(StoreError::AlreadyExists(chain.owner_id.clone()));
        }

        chains.insert(chain.owner_id.clone(), chain.clone());
        if let Err(e) = self.commit(&chains) {
            chains.remove(&chain.owner_id);
            tracing::warn!(owner_id = %chain.owner_id, error = %e, "create rolled back");
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, owner_id: &str) -> Result<IdentityChain> {
        self.read()?
            .get(owner_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(owner_id.to_string()))
    }

    fn update(&self, chain: &IdentityChain) -> Result<()> {
        let mut chains = self.write()?;
        let previous = match chains.get_mut(&chain.owner_id) {
            Some(slot) => std::mem::replace(slot, chain.clone()),
            None => return Err(StoreError::NotFound(chain.owner_id.clone())),
        };

        if let Err(e) = self.commit(&chains) {
            chains.insert(chain.owner_id.clone(), previous);
            tracing::warn!(owner_id = %chain.owner_id, error = %e, "update rolled back");
            return Err(e);
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<IdentityChain>> {
        Ok(self.read()?.values().cloned().collect())
    }
}

fn load(path: &Path) -> Result<Chains> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Chains::new()),
        Err(e) => return Err(e.into()),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Chains::new());
    }
    let doc: StoreDocument = serde_json::from_slice(&bytes)?;
    Ok(doc.chains.unwrap_or_default())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
