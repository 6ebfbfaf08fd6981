//! TOML-backed store.
//!
//! The whole tree lives in one document. A session loads it and stages
//! changes in memory. Commit takes an exclusive `fd-lock` on a sibling
//! `.lock` file, re-reads the document, replays the staged changes onto it
//! and writes it back atomically (temp file + rename).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use cfgchain_core::{PropertyMap, ResourceTree, StoreError, StoreSession};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::tree::{Staging, Tree};

/// Current schema version for store documents
pub const STORE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    tree: Tree,
}

fn default_schema_version() -> u32 {
    STORE_SCHEMA_VERSION
}

/// Location of a TOML store document.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Open a session. A missing document is an empty tree.
    pub fn session(&self) -> Result<FileSession, StoreError> {
        let tree = self.load()?;
        Ok(FileSession {
            store: self.clone(),
            staging: Staging::new(tree),
        })
    }

    /// Time of the last commit, if the document records one.
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.read_document()?.and_then(|doc| doc.saved_at))
    }

    fn load(&self) -> Result<Tree, StoreError> {
        Ok(self
            .read_document()?
            .map(|doc| doc.tree)
            .unwrap_or_default())
    }

    fn read_document(&self) -> Result<Option<StoreDocument>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };
        let doc: StoreDocument = toml::from_str(&content).map_err(|e| StoreError::Decode {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        if doc.schema_version > STORE_SCHEMA_VERSION {
            return Err(StoreError::Decode {
                path: self.path.display().to_string(),
                message: format!(
                    "schema version {} is newer than supported (v{})",
                    doc.schema_version, STORE_SCHEMA_VERSION
                ),
            });
        }
        Ok(Some(doc))
    }

    /// Run `f` while holding the exclusive lock on the document.
    fn with_write_lock<T>(
        &self,
        f: impl FnOnce(&Path) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| self.io_error(e))?;

        let lock_path = self.lock_path();
        let lock_file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| StoreError::Io {
                path: lock_path.display().to_string(),
                source,
            })?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write().map_err(|e| StoreError::Lock {
            path: lock_path.display().to_string(),
            message: e.to_string(),
        })?;

        f(&parent)
    }

    /// Caller must hold the write lock.
    fn write_locked(&self, parent: &Path, tree: &Tree) -> Result<(), StoreError> {
        let doc = StoreDocument {
            schema_version: STORE_SCHEMA_VERSION,
            saved_at: Some(Utc::now()),
            tree: tree.clone(),
        };
        let content =
            toml::to_string_pretty(&doc).map_err(|e| StoreError::Encode(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| self.io_error(e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Staging session over a [`FileStore`] document.
#[derive(Debug)]
pub struct FileSession {
    store: FileStore,
    staging: Staging,
}

impl ResourceTree for FileSession {
    fn exists(&self, path: &str) -> bool {
        self.staging.working.exists(path)
    }

    fn properties(&self, path: &str) -> Option<PropertyMap> {
        self.staging.working.properties(path)
    }

    fn child_names(&self, path: &str) -> Vec<String> {
        self.staging.working.child_names(path)
    }
}

impl StoreSession for FileSession {
    fn put_properties(&mut self, path: &str, properties: PropertyMap) -> Result<(), StoreError> {
        debug!(path, count = properties.len(), "staging properties");
        self.staging.put(path, properties)
    }

    fn ensure_node(&mut self, path: &str) -> Result<(), StoreError> {
        self.staging.ensure(path)
    }

    fn remove(&mut self, path: &str) -> Result<bool, StoreError> {
        let removed = self.staging.remove(path)?;
        if removed {
            debug!(path, "staging removal");
        }
        Ok(removed)
    }

    fn has_changes(&self) -> bool {
        self.staging.has_changes()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.staging.has_changes() {
            return Ok(());
        }
        let merged = self.store.with_write_lock(|parent| {
            let merged = self.staging.rebase(self.store.load()?)?;
            self.store.write_locked(parent, &merged)?;
            Ok(merged)
        })?;
        info!(
            path = %self.store.path.display(),
            replayed = self.staging.pending.len(),
            nodes = merged.root.count(),
            "store committed"
        );
        self.staging.committed(merged);
        Ok(())
    }

    fn revert(&mut self) {
        self.staging.revert();
    }
}
