//! Payloads handed to persistence strategies.

use std::collections::HashMap;

use crate::error::PersistError;
use crate::name::{NamePolicy, SegmentNamePolicy};
use crate::types::PropertyMap;

/// One configuration entry to write.
///
/// The item name is only meaningful inside a [`CollectionPersistData`];
/// singleton writes ignore it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPersistData {
    properties: PropertyMap,
    collection_item_name: Option<String>,
}

impl ItemPersistData {
    pub fn new(properties: PropertyMap) -> Self {
        Self {
            properties,
            collection_item_name: None,
        }
    }

    /// Set the collection item name (builder style).
    pub fn collection_item_name(mut self, name: impl Into<String>) -> Self {
        self.collection_item_name = Some(name.into());
        self
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn item_name(&self) -> Option<&str> {
        self.collection_item_name.as_deref()
    }

    pub fn into_properties(self) -> PropertyMap {
        self.properties
    }
}

/// Replace-all payload for a configuration collection.
///
/// Holds the complete desired set of items plus optional properties for the
/// collection parent. Item names are checked when the value is built, so a
/// `CollectionPersistData` that exists is always safe to write.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPersistData {
    items: Vec<ItemPersistData>,
    properties: Option<PropertyMap>,
}

impl CollectionPersistData {
    /// Validate `items` against the default [`SegmentNamePolicy`].
    pub fn new(items: Vec<ItemPersistData>) -> Result<Self, PersistError> {
        Self::with_policy(items, &SegmentNamePolicy::default())
    }

    /// Validate `items` against `policy`.
    ///
    /// Fails on the first item that has no name, repeats an earlier name
    /// (compared by the policy's canonical form) or breaks the policy.
    pub fn with_policy(
        items: Vec<ItemPersistData>,
        policy: &dyn NamePolicy,
    ) -> Result<Self, PersistError> {
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(name) = item.item_name() else {
                return Err(PersistError::MissingItemName { index });
            };
            let key = policy.canonical(name).into_owned();
            if let Some(&first_index) = seen.get(&key) {
                return Err(PersistError::DuplicateItemName {
                    name: name.to_string(),
                    index,
                    first_index,
                });
            }
            if let Err(reason) = policy.check(name) {
                return Err(PersistError::InvalidItemName {
                    name: name.to_string(),
                    index,
                    reason,
                });
            }
            seen.insert(key, index);
        }
        Ok(Self {
            items,
            properties: None,
        })
    }

    /// Attach properties for the collection parent resource.
    pub fn properties(mut self, properties: PropertyMap) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn items(&self) -> &Vec<ItemPersistData> {
        &self.items
    }

    pub fn parent_properties(&self) -> Option<&PropertyMap> {
        self.properties.as_ref()
    }

    /// Item names in order. Every item has one by construction.
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(ItemPersistData::item_name)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
#[path = "persist_data_tests.rs"]
mod tests;
