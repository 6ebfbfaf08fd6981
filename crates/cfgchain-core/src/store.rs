//! Store session contract consumed by persistence strategies.
//!
//! The hierarchical store itself lives outside this crate; strategies only see
//! these two traits. Writes are staged on the session and become visible to
//! other sessions when the caller commits.

use std::fmt;

use crate::error::StoreError;
use crate::path;
use crate::types::PropertyMap;

/// Read side of a hierarchical resource tree. All paths are absolute.
pub trait ResourceTree {
    /// Whether a node exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Properties of the node at `path`, `None` when it does not exist.
    fn properties(&self, path: &str) -> Option<PropertyMap>;

    /// Names of the direct children of `path`, in insertion order.
    /// Empty when the node does not exist.
    fn child_names(&self, path: &str) -> Vec<String>;
}

/// Write side of a store session.
///
/// None of these methods commit. `commit` and `revert` belong to the caller
/// that owns the session.
pub trait StoreSession: ResourceTree {
    /// Replace every property at `path` with `properties`, creating the node
    /// and any missing ancestors. Existing children are untouched.
    fn put_properties(&mut self, path: &str, properties: PropertyMap) -> Result<(), StoreError>;

    /// Create the node at `path` (and ancestors) if missing, leaving any
    /// existing properties as they are.
    fn ensure_node(&mut self, path: &str) -> Result<(), StoreError>;

    /// Remove the node at `path` with its whole subtree. Returns whether a
    /// node was there.
    fn remove(&mut self, path: &str) -> Result<bool, StoreError>;

    /// Whether staged changes are pending.
    fn has_changes(&self) -> bool;

    /// Publish staged changes. They are applied in order on top of the
    /// latest committed state, so commits from other sessions are kept.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Drop staged changes.
    fn revert(&mut self);
}

/// Handle to a location in a resource tree plus its logical path.
///
/// The same handle type is used for singleton, collection-parent and
/// collection-item resources; the role is supplied separately.
#[derive(Clone)]
pub struct ResourceRef<'a> {
    tree: &'a dyn ResourceTree,
    path: String,
}

impl<'a> ResourceRef<'a> {
    pub fn new(tree: &'a dyn ResourceTree, path: impl Into<String>) -> Self {
        Self {
            tree,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn into_path(self) -> String {
        self.path
    }

    pub fn name(&self) -> &str {
        path::name(&self.path)
    }

    pub fn tree(&self) -> &'a dyn ResourceTree {
        self.tree
    }

    pub fn exists(&self) -> bool {
        self.tree.exists(&self.path)
    }

    pub fn properties(&self) -> Option<PropertyMap> {
        self.tree.properties(&self.path)
    }

    pub fn child_names(&self) -> Vec<String> {
        self.tree.child_names(&self.path)
    }

    /// Existing child resource named `name` (which may contain separators).
    pub fn child(&self, name: &str) -> Option<ResourceRef<'a>> {
        let child_path = path::join(&self.path, name);
        self.tree
            .exists(&child_path)
            .then(|| ResourceRef::new(self.tree, child_path))
    }

    /// Same tree, different location; the target does not have to exist.
    pub fn with_path(&self, path: impl Into<String>) -> ResourceRef<'a> {
        ResourceRef::new(self.tree, path)
    }
}

impl fmt::Debug for ResourceRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRef")
            .field("path", &self.path)
            .finish()
    }
}

impl PartialEq for ResourceRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}
