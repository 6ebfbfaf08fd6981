//! Write helpers shared by the built-in strategies.

use std::collections::HashSet;

use cfgchain_core::path;
use cfgchain_core::{CollectionPersistData, PersistError, StoreSession};
use tracing::debug;

/// Replace the items below `parent_path` with exactly `data.items()`.
///
/// Existing children whose name is not in `data` are removed (except
/// `reserved`, which never counts as an item). Surviving and new items get
/// their properties written at `item_data_path(item_path)`. Parent
/// properties, when supplied, replace those on `parent_path` itself.
pub(crate) fn replace_collection(
    store: &mut dyn StoreSession,
    parent_path: &str,
    data: &CollectionPersistData,
    reserved: Option<&str>,
    item_data_path: impl Fn(&str) -> String,
) -> Result<(), PersistError> {
    store.ensure_node(parent_path)?;

    let wanted: HashSet<&str> = data.item_names().collect();
    for existing in store.child_names(parent_path) {
        if Some(existing.as_str()) == reserved || wanted.contains(existing.as_str()) {
            continue;
        }
        let stale = path::join(parent_path, &existing);
        debug!(path = %stale, "removing stale collection item");
        store.remove(&stale)?;
    }

    for item in data.items() {
        let Some(name) = item.item_name() else {
            continue;
        };
        let item_path = path::join(parent_path, name);
        store.put_properties(&item_data_path(&item_path), item.properties().clone())?;
    }

    if let Some(properties) = data.parent_properties() {
        store.put_properties(parent_path, properties.clone())?;
    }
    Ok(())
}
