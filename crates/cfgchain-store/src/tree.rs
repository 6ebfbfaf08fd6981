//! In-memory node tree shared by the store implementations.

use cfgchain_core::path;
use cfgchain_core::{PropertyMap, StoreError};
use serde::{Deserialize, Serialize};

/// One node: its properties plus ordered children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    fn child_or_insert(&mut self, name: &str) -> &mut Node {
        let idx = match self.children.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.children.push(Node::named(name));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

/// A rooted tree addressed by absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    #[serde(default)]
    pub root: Node,
}

impl Tree {
    pub fn get(&self, raw_path: &str) -> Option<&Node> {
        let normalized = path::normalize(raw_path).ok()?;
        let mut node = &self.root;
        for segment in path::segments(&normalized) {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Node at `raw_path`, created together with missing ancestors.
    pub fn get_or_create(&mut self, raw_path: &str) -> Result<&mut Node, StoreError> {
        let normalized = path::normalize(raw_path)?;
        let mut node = &mut self.root;
        for segment in path::segments(&normalized) {
            node = node.child_or_insert(segment);
        }
        Ok(node)
    }

    /// Remove the subtree at `raw_path`. The root cannot be removed.
    pub fn remove(&mut self, raw_path: &str) -> Result<bool, StoreError> {
        let normalized = path::normalize(raw_path)?;
        let Some(parent_path) = path::parent(&normalized) else {
            return Err(StoreError::RootRemoval);
        };
        let name = path::name(&normalized);
        let mut node = &mut self.root;
        for segment in path::segments(parent_path) {
            match node.child_mut(segment) {
                Some(child) => node = child,
                None => return Ok(false),
            }
        }
        let before = node.children.len();
        node.children.retain(|c| c.name != name);
        Ok(node.children.len() != before)
    }

    pub fn exists(&self, raw_path: &str) -> bool {
        self.get(raw_path).is_some()
    }

    pub fn properties(&self, raw_path: &str) -> Option<PropertyMap> {
        self.get(raw_path).map(|n| n.properties.clone())
    }

    pub fn child_names(&self, raw_path: &str) -> Vec<String> {
        self.get(raw_path)
            .map(|n| n.children.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }
}

/// One staged write, replayed onto the latest tree at commit time.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Put { path: String, properties: PropertyMap },
    Ensure { path: String },
    Remove { path: String },
}

impl Tree {
    pub fn apply(&mut self, change: &Change) -> Result<(), StoreError> {
        match change {
            Change::Put { path, properties } => {
                self.get_or_create(path)?.properties = properties.clone();
            }
            Change::Ensure { path } => {
                self.get_or_create(path)?;
            }
            Change::Remove { path } => {
                self.remove(path)?;
            }
        }
        Ok(())
    }
}

/// Working copy plus the changes staged on it since `base`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Staging {
    pub(crate) base: Tree,
    pub(crate) working: Tree,
    pub(crate) pending: Vec<Change>,
}

impl Staging {
    pub(crate) fn new(tree: Tree) -> Self {
        Self {
            working: tree.clone(),
            base: tree,
            pending: Vec::new(),
        }
    }

    pub(crate) fn stage(&mut self, change: Change) -> Result<(), StoreError> {
        self.working.apply(&change)?;
        self.pending.push(change);
        Ok(())
    }

    pub(crate) fn put(&mut self, path: &str, properties: PropertyMap) -> Result<(), StoreError> {
        self.stage(Change::Put {
            path: path.to_string(),
            properties,
        })
    }

    pub(crate) fn ensure(&mut self, path: &str) -> Result<(), StoreError> {
        if self.working.exists(path) {
            return Ok(());
        }
        self.stage(Change::Ensure {
            path: path.to_string(),
        })
    }

    pub(crate) fn remove(&mut self, path: &str) -> Result<bool, StoreError> {
        if !self.working.exists(path) {
            // Still rejects the root and malformed paths.
            return self.working.remove(path);
        }
        self.stage(Change::Remove {
            path: path.to_string(),
        })?;
        Ok(true)
    }

    pub(crate) fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Replay the pending changes onto `latest`.
    pub(crate) fn rebase(&self, mut latest: Tree) -> Result<Tree, StoreError> {
        for change in &self.pending {
            latest.apply(change)?;
        }
        Ok(latest)
    }

    pub(crate) fn committed(&mut self, tree: Tree) {
        self.working = tree.clone();
        self.base = tree;
        self.pending.clear();
    }

    pub(crate) fn revert(&mut self) {
        self.working = self.base.clone();
        self.pending.clear();
    }
}
