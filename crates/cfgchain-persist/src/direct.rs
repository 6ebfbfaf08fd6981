//! Accept-all strategy that stores data exactly where it is addressed.

use cfgchain_core::{
    CollectionPersistData, ConfigRole, ItemPersistData, PersistError, ResourceRef, StoreSession,
    WriteOutcome,
};
use tracing::{debug, warn};

use crate::strategy::PersistenceStrategy;
use crate::write::replace_collection;

pub const DIRECT_STRATEGY_NAME: &str = "direct";

/// Identity transforms, writes in place. Belongs at the end of a chain:
/// nothing registered after it is ever consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectPersistenceStrategy;

impl PersistenceStrategy for DirectPersistenceStrategy {
    fn name(&self) -> &str {
        DIRECT_STRATEGY_NAME
    }

    fn resolve_resource<'a>(
        &self,
        resource: &ResourceRef<'a>,
        _role: ConfigRole,
    ) -> Option<ResourceRef<'a>> {
        Some(resource.clone())
    }

    fn resolve_path(&self, path: &str, _role: ConfigRole) -> Option<String> {
        Some(path.to_string())
    }

    fn resolve_config_name(
        &self,
        name: &str,
        _related_path: Option<&str>,
        _role: ConfigRole,
    ) -> Option<String> {
        Some(name.to_string())
    }

    fn persist_singleton(
        &self,
        store: &mut dyn StoreSession,
        path: &str,
        data: &ItemPersistData,
    ) -> Result<WriteOutcome, PersistError> {
        if let Some(name) = data.item_name() {
            warn!(path, item_name = name, "ignoring collection item name on singleton write");
        }
        store.put_properties(path, data.properties().clone())?;
        Ok(WriteOutcome::Accepted)
    }

    fn persist_collection(
        &self,
        store: &mut dyn StoreSession,
        parent_path: &str,
        data: &CollectionPersistData,
    ) -> Result<WriteOutcome, PersistError> {
        replace_collection(store, parent_path, data, None, |item_path| {
            item_path.to_string()
        })?;
        Ok(WriteOutcome::Accepted)
    }

    fn delete(
        &self,
        store: &mut dyn StoreSession,
        path: &str,
    ) -> Result<WriteOutcome, PersistError> {
        if !store.remove(path)? {
            debug!(path, "nothing to delete");
        }
        Ok(WriteOutcome::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgchain_core::{PropertyMap, PropertyValue, ResourceTree};
    use cfgchain_store::MemoryStore;

    fn props(key: &str, value: i64) -> PropertyMap {
        let mut map = PropertyMap::new();
        map.insert(key.to_string(), PropertyValue::Integer(value));
        map
    }

    fn item(name: &str, value: i64) -> ItemPersistData {
        ItemPersistData::new(props("value", value)).collection_item_name(name)
    }

    #[test]
    fn transforms_are_identity_for_every_role() {
        let store = MemoryStore::new();
        let session = store.session().unwrap();
        let resource = ResourceRef::new(&session, "/conf/site");
        for role in ConfigRole::ALL {
            let strategy = DirectPersistenceStrategy;
            assert_eq!(strategy.resolve_resource(&resource, role), Some(resource.clone()));
            assert_eq!(strategy.resolve_path("/conf/site", role).as_deref(), Some("/conf/site"));
            assert_eq!(
                strategy.resolve_config_name("a/b", None, role).as_deref(),
                Some("a/b")
            );
        }
    }

    #[test]
    fn singleton_write_replaces_all_properties() {
        let store = MemoryStore::new();
        let mut session = store.session().unwrap();
        session.put_properties("/conf/x", props("old", 1)).unwrap();

        let outcome = DirectPersistenceStrategy
            .persist_singleton(&mut session, "/conf/x", &ItemPersistData::new(props("new", 2)))
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Accepted);
        assert_eq!(session.properties("/conf/x"), Some(props("new", 2)));
    }

    #[test]
    fn collection_write_replaces_items_and_keeps_nested_children() {
        let store = MemoryStore::new();
        let mut session = store.session().unwrap();
        session.put_properties("/conf/list/stale", props("value", 0)).unwrap();
        session.put_properties("/conf/list/keep/nested", props("n", 1)).unwrap();

        let data = CollectionPersistData::new(vec![item("keep", 1), item("fresh", 2)])
            .unwrap()
            .properties(props("parent", 9));
        DirectPersistenceStrategy
            .persist_collection(&mut session, "/conf/list", &data)
            .unwrap();

        assert_eq!(session.child_names("/conf/list"), vec!["keep", "fresh"]);
        assert_eq!(session.properties("/conf/list/keep"), Some(props("value", 1)));
        assert_eq!(session.properties("/conf/list/fresh"), Some(props("value", 2)));
        assert!(session.exists("/conf/list/keep/nested"));
        assert_eq!(session.properties("/conf/list"), Some(props("parent", 9)));
    }

    #[test]
    fn empty_collection_clears_parent() {
        let store = MemoryStore::new();
        let mut session = store.session().unwrap();
        session.put_properties("/conf/list/a", props("value", 0)).unwrap();
        let data = CollectionPersistData::new(Vec::new()).unwrap();
        DirectPersistenceStrategy
            .persist_collection(&mut session, "/conf/list", &data)
            .unwrap();
        assert!(session.exists("/conf/list"));
        assert!(session.child_names("/conf/list").is_empty());
    }

    #[test]
    fn delete_accepts_missing_paths() {
        let store = MemoryStore::new();
        let mut session = store.session().unwrap();
        session.put_properties("/conf/x/y", props("v", 1)).unwrap();
        assert!(DirectPersistenceStrategy.delete(&mut session, "/conf/x").unwrap().is_accepted());
        assert!(!session.exists("/conf/x/y"));
        assert!(DirectPersistenceStrategy.delete(&mut session, "/conf/x").unwrap().is_accepted());
    }

    #[test]
    fn store_errors_propagate() {
        let store = MemoryStore::new();
        let mut session = store.session().unwrap();
        let err = DirectPersistenceStrategy.delete(&mut session, "/").unwrap_err();
        assert!(matches!(err, PersistError::Store(_)));
    }
}
