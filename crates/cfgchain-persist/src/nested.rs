//! Strategy that keeps configuration data in a dedicated child node.
//!
//! With `content_node = "content"` a singleton addressed as `/conf/site/x`
//! stores its properties on `/conf/site/x/content`, and collection item `a`
//! below `/conf/site/list` stores them on `/conf/site/list/a/content`.
//! Collection parents stay where they are.

use cfgchain_core::path;
use cfgchain_core::{
    CollectionPersistData, ConfigRole, ItemPersistData, PersistError, ResourceRef, StoreSession,
    WriteOutcome,
};
use tracing::warn;

use crate::strategy::PersistenceStrategy;
use crate::write::replace_collection;

pub const NESTED_STRATEGY_NAME: &str = "nested-content";
pub const DEFAULT_CONTENT_NODE: &str = "content";

#[derive(Debug, Clone)]
pub struct NestedContentStrategy {
    content_node: String,
    path_prefix: Option<String>,
}

impl Default for NestedContentStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_NODE)
    }
}

impl NestedContentStrategy {
    pub fn new(content_node: impl Into<String>) -> Self {
        Self {
            content_node: content_node.into(),
            path_prefix: None,
        }
    }

    /// Restrict the strategy to paths at or below `prefix`.
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        self.path_prefix = Some(if trimmed.is_empty() {
            path::ROOT.to_string()
        } else {
            trimmed.to_string()
        });
        self
    }

    pub fn content_node(&self) -> &str {
        &self.content_node
    }

    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    fn applies_to(&self, target: &str) -> bool {
        match &self.path_prefix {
            Some(prefix) => path::is_same_or_descendant(target, prefix),
            None => true,
        }
    }

    fn nests(role: ConfigRole) -> bool {
        !matches!(role, ConfigRole::CollectionParent)
    }
}

impl PersistenceStrategy for NestedContentStrategy {
    fn name(&self) -> &str {
        NESTED_STRATEGY_NAME
    }

    fn resolve_resource<'a>(
        &self,
        resource: &ResourceRef<'a>,
        role: ConfigRole,
    ) -> Option<ResourceRef<'a>> {
        if !self.applies_to(resource.path()) {
            return None;
        }
        if Self::nests(role) {
            // Declines when the content child is missing so a fallback
            // strategy can read data stored in place.
            resource.child(&self.content_node)
        } else {
            Some(resource.clone())
        }
    }

    fn resolve_path(&self, resource_path: &str, role: ConfigRole) -> Option<String> {
        if !self.applies_to(resource_path) {
            return None;
        }
        if Self::nests(role) {
            Some(path::join(resource_path, &self.content_node))
        } else {
            Some(resource_path.to_string())
        }
    }

    fn resolve_config_name(
        &self,
        name: &str,
        related_path: Option<&str>,
        role: ConfigRole,
    ) -> Option<String> {
        if let Some(related) = related_path {
            if !self.applies_to(related) {
                return None;
            }
        }
        if Self::nests(role) {
            Some(path::join(name, &self.content_node))
        } else {
            Some(name.to_string())
        }
    }

    fn persist_singleton(
        &self,
        store: &mut dyn StoreSession,
        config_path: &str,
        data: &ItemPersistData,
    ) -> Result<WriteOutcome, PersistError> {
        if !self.applies_to(config_path) {
            return Ok(WriteOutcome::Declined);
        }
        if let Some(name) = data.item_name() {
            warn!(path = config_path, item_name = name, "ignoring collection item name on singleton write");
        }
        store.ensure_node(config_path)?;
        store.put_properties(
            &path::join(config_path, &self.content_node),
            data.properties().clone(),
        )?;
        Ok(WriteOutcome::Accepted)
    }

    fn persist_collection(
        &self,
        store: &mut dyn StoreSession,
        parent_path: &str,
        data: &CollectionPersistData,
    ) -> Result<WriteOutcome, PersistError> {
        if !self.applies_to(parent_path) {
            return Ok(WriteOutcome::Declined);
        }
        if data.item_names().any(|n| n == self.content_node) {
            return Err(PersistError::Strategy {
                strategy: NESTED_STRATEGY_NAME.to_string(),
                message: format!(
                    "collection item name '{}' is reserved for the content node",
                    self.content_node
                ),
            });
        }
        replace_collection(
            store,
            parent_path,
            data,
            Some(&self.content_node),
            |item_path| path::join(item_path, &self.content_node),
        )?;
        Ok(WriteOutcome::Accepted)
    }

    fn delete(
        &self,
        store: &mut dyn StoreSession,
        config_path: &str,
    ) -> Result<WriteOutcome, PersistError> {
        if !self.applies_to(config_path) {
            return Ok(WriteOutcome::Declined);
        }
        store.remove(config_path)?;
        Ok(WriteOutcome::Accepted)
    }

    fn reserved_child_name(&self) -> Option<&str> {
        Some(&self.content_node)
    }
}

#[cfg(test)]
#[path = "nested_tests.rs"]
mod tests;
