//! Process-local store. Sessions stage changes on a private copy of the tree
//! and replay them onto the shared tree on commit, so overlapping sessions
//! keep each other's writes.

use std::sync::{Arc, RwLock};

use cfgchain_core::{PropertyMap, ResourceTree, StoreError, StoreSession};
use tracing::debug;

use crate::tree::{Staging, Tree};

/// Shared committed tree. Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    committed: Arc<RwLock<Tree>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tree(tree: Tree) -> Self {
        Self {
            committed: Arc::new(RwLock::new(tree)),
        }
    }

    /// Open a session over a snapshot of the committed tree.
    pub fn session(&self) -> Result<MemorySession, StoreError> {
        let snapshot = self.snapshot()?;
        Ok(MemorySession {
            store: self.clone(),
            staging: Staging::new(snapshot),
        })
    }

    /// Copy of the committed tree.
    pub fn snapshot(&self) -> Result<Tree, StoreError> {
        self.committed
            .read()
            .map(|tree| tree.clone())
            .map_err(|_| poisoned())
    }
}

fn poisoned() -> StoreError {
    StoreError::Lock {
        path: "memory".to_string(),
        message: "memory store lock poisoned".to_string(),
    }
}

/// Staging session over a [`MemoryStore`]. Reads see the session's own
/// uncommitted writes.
#[derive(Debug)]
pub struct MemorySession {
    store: MemoryStore,
    staging: Staging,
}

impl ResourceTree for MemorySession {
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

impl StoreSession for MemorySession {
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
        let mut committed = self.store.committed.write().map_err(|_| poisoned())?;
        let merged = self.staging.rebase(committed.clone())?;
        *committed = merged.clone();
        drop(committed);
        self.staging.committed(merged);
        Ok(())
    }

    fn revert(&mut self) {
        self.staging.revert();
    }
}
