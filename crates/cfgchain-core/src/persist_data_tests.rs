use super::*;
use crate::name::PatternNamePolicy;
use crate::types::PropertyValue;
use proptest::prelude::*;

fn item(name: &str) -> ItemPersistData {
    ItemPersistData::new(PropertyMap::new()).collection_item_name(name)
}

#[test]
fn test_properties() {
    let items = vec![item("item1"), item("item2"), item("item3")];
    let items_ptr = items.as_ptr();
    let mut props = PropertyMap::new();
    props.insert("title".into(), PropertyValue::from("Collection"));

    let under_test = CollectionPersistData::new(items)
        .unwrap()
        .properties(props.clone());

    assert_eq!(under_test.items().len(), 3);
    // Same allocation: the payload keeps the caller's list as-is.
    assert_eq!(under_test.items().as_ptr(), items_ptr);
    assert_eq!(under_test.parent_properties(), Some(&props));
    assert_eq!(
        under_test.item_names().collect::<Vec<_>>(),
        vec!["item1", "item2", "item3"]
    );
}

#[test]
fn test_items_duplicate_keys() {
    let err = CollectionPersistData::new(vec![item("item1"), item("item2"), item("item1")])
        .unwrap_err();
    assert!(matches!(
        err,
        PersistError::DuplicateItemName { ref name, index: 2, first_index: 0 } if name == "item1"
    ));
}

#[test]
fn test_items_missing_item_name() {
    let err = CollectionPersistData::new(vec![
        item("item1"),
        item("item2"),
        ItemPersistData::new(PropertyMap::new()),
    ])
    .unwrap_err();
    assert!(matches!(err, PersistError::MissingItemName { index: 2 }));
}

#[test]
fn test_items_invalid_item_name() {
    let err = CollectionPersistData::new(vec![item("item1"), item("item2"), item("item #1")])
        .unwrap_err();
    assert!(matches!(
        err,
        PersistError::InvalidItemName { ref name, index: 2, .. } if name == "item #1"
    ));
    assert!(err.is_validation());
}

#[test]
fn test_empty_collection_is_valid() {
    let data = CollectionPersistData::new(Vec::new()).unwrap();
    assert!(data.is_empty());
    assert_eq!(data.len(), 0);
    assert!(data.parent_properties().is_none());
}

#[test]
fn test_missing_name_reported_before_later_duplicates() {
    let err = CollectionPersistData::new(vec![
        item("a"),
        ItemPersistData::new(PropertyMap::new()),
        item("a"),
    ])
    .unwrap_err();
    assert!(matches!(err, PersistError::MissingItemName { index: 1 }));
}

#[test]
fn test_case_insensitive_policy_detects_equivalent_names() {
    let policy = crate::name::SegmentNamePolicy::new(64, true);
    let err = CollectionPersistData::with_policy(vec![item("Item"), item("item")], &policy)
        .unwrap_err();
    assert!(matches!(err, PersistError::DuplicateItemName { index: 1, .. }));

    let strict = crate::name::SegmentNamePolicy::default();
    assert!(CollectionPersistData::with_policy(vec![item("Item"), item("item")], &strict).is_ok());
}

#[test]
fn test_custom_policy_is_used() {
    let policy = PatternNamePolicy::new("^item[0-9]+$", 64, false).unwrap();
    assert!(CollectionPersistData::with_policy(vec![item("item1")], &policy).is_ok());
    assert!(CollectionPersistData::with_policy(vec![item("other")], &policy).is_err());
}

#[test]
fn test_item_persist_data_accessors() {
    let mut props = PropertyMap::new();
    props.insert("enabled".into(), PropertyValue::Bool(true));
    let data = ItemPersistData::new(props.clone());
    assert_eq!(data.item_name(), None);
    assert_eq!(data.properties(), &props);
    let named = data.collection_item_name("x");
    assert_eq!(named.item_name(), Some("x"));
    assert_eq!(named.into_properties(), props);
}

fn valid_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,12}"
}

proptest! {
    #[test]
    fn distinct_valid_names_always_succeed(
        names in prop::collection::hash_set(valid_name(), 0..16)
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let items: Vec<ItemPersistData> = names.iter().map(|n| item(n)).collect();
        let data = CollectionPersistData::new(items).unwrap();
        prop_assert_eq!(data.item_names().collect::<Vec<_>>(), names.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn any_duplicate_fails(
        names in prop::collection::hash_set(valid_name(), 1..10),
        dup_from in any::<prop::sample::Index>(),
        insert_at in any::<prop::sample::Index>(),
    ) {
        let mut names: Vec<String> = names.into_iter().collect();
        let dup = names[dup_from.index(names.len())].clone();
        let at = insert_at.index(names.len() + 1);
        names.insert(at, dup);
        let items: Vec<ItemPersistData> = names.iter().map(|n| item(n)).collect();
        let err = CollectionPersistData::new(items).unwrap_err();
        let is_duplicate = matches!(err, PersistError::DuplicateItemName { .. });
        prop_assert!(is_duplicate);
    }

    #[test]
    fn any_missing_name_fails(
        names in prop::collection::hash_set(valid_name(), 0..10),
        insert_at in any::<prop::sample::Index>(),
    ) {
        let mut items: Vec<ItemPersistData> = names.iter().map(|n| item(n)).collect();
        let at = insert_at.index(items.len() + 1);
        items.insert(at, ItemPersistData::new(PropertyMap::new()));
        let err = CollectionPersistData::new(items).unwrap_err();
        let is_missing = matches!(err, PersistError::MissingItemName { index } if index == at);
        prop_assert!(is_missing);
    }

    #[test]
    fn internal_space_fails(left in "[a-z]{1,6}", right in "[a-z]{1,6}") {
        let err = CollectionPersistData::new(vec![item(&format!("{left} {right}"))]).unwrap_err();
        let is_invalid = matches!(err, PersistError::InvalidItemName { .. });
        prop_assert!(is_invalid);
    }
}
