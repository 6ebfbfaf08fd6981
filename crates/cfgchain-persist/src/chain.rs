//! Ordered dispatch over persistence strategies.
//!
//! Every operation walks the strategies in registration order and stops at
//! the first one that accepts. Errors are returned as-is: a failing strategy
//! ends the call, the chain never falls through to the next one.

use std::sync::Arc;

use cfgchain_core::{
    CollectionPersistData, ConfigRole, ItemPersistData, PersistError, ResourceRef, StoreSession,
    WriteOutcome,
};
use tracing::debug;

use crate::strategy::PersistenceStrategy;

#[derive(Clone, Default)]
pub struct StrategyChain {
    strategies: Vec<Arc<dyn PersistenceStrategy>>,
}

impl std::fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyChain")
            .field("strategies", &self.names())
            .finish()
    }
}

impl StrategyChain {
    /// Build a chain from an already ordered list.
    pub fn new(strategies: Vec<Arc<dyn PersistenceStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    fn first_accepting<T>(
        &self,
        operation: &'static str,
        mut op: impl FnMut(&dyn PersistenceStrategy) -> Option<T>,
    ) -> Option<T> {
        for strategy in &self.strategies {
            if let Some(result) = op(strategy.as_ref()) {
                debug!(strategy = strategy.name(), operation, "strategy accepted");
                return Some(result);
            }
        }
        debug!(operation, "no strategy accepted");
        None
    }

    fn first_writing(
        &self,
        operation: &'static str,
        path: &str,
        mut op: impl FnMut(&dyn PersistenceStrategy) -> Result<WriteOutcome, PersistError>,
    ) -> Result<WriteOutcome, PersistError> {
        for strategy in &self.strategies {
            if op(strategy.as_ref())?.is_accepted() {
                debug!(strategy = strategy.name(), operation, path, "strategy accepted");
                return Ok(WriteOutcome::Accepted);
            }
        }
        debug!(operation, path, "no strategy accepted");
        Ok(WriteOutcome::Declined)
    }

    pub fn resolve_resource<'a>(
        &self,
        resource: &ResourceRef<'a>,
        role: ConfigRole,
    ) -> Option<ResourceRef<'a>> {
        self.first_accepting("resolve_resource", |s| s.resolve_resource(resource, role))
    }

    pub fn resolve_path(&self, path: &str, role: ConfigRole) -> Option<String> {
        self.first_accepting("resolve_path", |s| s.resolve_path(path, role))
    }

    pub fn resolve_config_name(
        &self,
        name: &str,
        related_path: Option<&str>,
        role: ConfigRole,
    ) -> Option<String> {
        self.first_accepting("resolve_config_name", |s| {
            s.resolve_config_name(name, related_path, role)
        })
    }

    pub fn persist_singleton(
        &self,
        store: &mut dyn StoreSession,
        path: &str,
        data: &ItemPersistData,
    ) -> Result<WriteOutcome, PersistError> {
        self.first_writing("persist_singleton", path, |s| {
            s.persist_singleton(&mut *store, path, data)
        })
    }

    pub fn persist_collection(
        &self,
        store: &mut dyn StoreSession,
        parent_path: &str,
        data: &CollectionPersistData,
    ) -> Result<WriteOutcome, PersistError> {
        self.first_writing("persist_collection", parent_path, |s| {
            s.persist_collection(&mut *store, parent_path, data)
        })
    }

    pub fn delete(
        &self,
        store: &mut dyn StoreSession,
        path: &str,
    ) -> Result<WriteOutcome, PersistError> {
        self.first_writing("delete", path, |s| s.delete(&mut *store, path))
    }

    /// Item resources below the collection parent `parent`, in store order.
    ///
    /// The parent is resolved as [`ConfigRole::CollectionParent`] first. A
    /// child reserved by the strategy that handled the parent is skipped.
    /// Items are returned unresolved; resolve each as
    /// [`ConfigRole::CollectionItem`] to read its data.
    pub fn collection_items<'a>(&self, parent: &ResourceRef<'a>) -> Vec<ResourceRef<'a>> {
        let mut handled = None;
        for strategy in &self.strategies {
            if let Some(resolved) = strategy.resolve_resource(parent, ConfigRole::CollectionParent) {
                handled = Some((resolved, strategy.reserved_child_name()));
                break;
            }
        }
        let (resolved, reserved) = handled.unwrap_or_else(|| (parent.clone(), None));
        resolved
            .child_names()
            .into_iter()
            .filter(|name| Some(name.as_str()) != reserved)
            .filter_map(|name| resolved.child(&name))
            .collect()
    }

    /// The resolved resource, or the input unchanged when every strategy declines.
    pub fn resolve_resource_or_identity<'a>(
        &self,
        resource: &ResourceRef<'a>,
        role: ConfigRole,
    ) -> ResourceRef<'a> {
        self.resolve_resource(resource, role)
            .unwrap_or_else(|| resource.clone())
    }

    /// The resolved path, or the input unchanged when every strategy declines.
    pub fn resolve_path_or_identity(&self, path: &str, role: ConfigRole) -> String {
        self.resolve_path(path, role)
            .unwrap_or_else(|| path.to_string())
    }

    /// The resolved name, or the input unchanged when every strategy declines.
    pub fn resolve_config_name_or_identity(
        &self,
        name: &str,
        related_path: Option<&str>,
        role: ConfigRole,
    ) -> String {
        self.resolve_config_name(name, related_path, role)
            .unwrap_or_else(|| name.to_string())
    }

    /// Like [`persist_singleton`](Self::persist_singleton) but an unhandled
    /// write is an error.
    pub fn persist_singleton_required(
        &self,
        store: &mut dyn StoreSession,
        path: &str,
        data: &ItemPersistData,
    ) -> Result<(), PersistError> {
        require(self.persist_singleton(store, path, data)?, "persist_singleton", path)
    }

    pub fn persist_collection_required(
        &self,
        store: &mut dyn StoreSession,
        parent_path: &str,
        data: &CollectionPersistData,
    ) -> Result<(), PersistError> {
        require(
            self.persist_collection(store, parent_path, data)?,
            "persist_collection",
            parent_path,
        )
    }

    pub fn delete_required(
        &self,
        store: &mut dyn StoreSession,
        path: &str,
    ) -> Result<(), PersistError> {
        require(self.delete(store, path)?, "delete", path)
    }
}

fn require(outcome: WriteOutcome, operation: &'static str, path: &str) -> Result<(), PersistError> {
    match outcome {
        WriteOutcome::Accepted => Ok(()),
        WriteOutcome::Declined => Err(PersistError::Unhandled {
            operation,
            path: path.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;
