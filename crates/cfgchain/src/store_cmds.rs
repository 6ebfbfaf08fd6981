use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use cfgchain_config::build_name_policy;
use cfgchain_core::{
    CollectionPersistData, ConfigRole, ItemPersistData, OutputFormat, PropertyMap, ResourceRef,
};

use crate::workspace::{Workspace, parse_assignment, resource_path, write_and_commit};

#[derive(Debug, Serialize)]
struct ResolvedConfig {
    path: String,
    properties: PropertyMap,
}

#[derive(Debug, Serialize)]
struct CollectionItemView {
    name: String,
    path: String,
    properties: PropertyMap,
}

/// On-disk shape accepted by `set-collection --file`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CollectionFile {
    #[serde(default)]
    pub properties: Option<PropertyMap>,
    #[serde(default)]
    pub items: Vec<CollectionFileItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionFileItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl CollectionFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read collection file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse collection file: {}", path.display()))
    }

    fn into_items(self) -> (Vec<ItemPersistData>, Option<PropertyMap>) {
        let items = self
            .items
            .into_iter()
            .map(|entry| {
                let item = ItemPersistData::new(entry.properties);
                match entry.name {
                    Some(name) => item.collection_item_name(name),
                    None => item,
                }
            })
            .collect();
        (items, self.properties)
    }
}

pub(crate) fn handle_get(
    cd: Option<String>,
    raw_path: String,
    role: ConfigRole,
    format: OutputFormat,
) -> Result<()> {
    let workspace = Workspace::open(cd.as_deref())?;
    let path = resource_path(&raw_path)?;
    let session = workspace.session()?;

    let resource = ResourceRef::new(&session, path);
    let resolved = workspace
        .chain
        .resolve_resource_or_identity(&resource, role);
    let Some(properties) = resolved.properties() else {
        bail!("No configuration stored at {}", resolved.path());
    };

    let view = ResolvedConfig {
        path: resolved.into_path(),
        properties,
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => {
            println!("# {}", view.path);
            print!("{}", toml::to_string_pretty(&view.properties)?);
        }
    }
    Ok(())
}

pub(crate) fn handle_list(cd: Option<String>, raw_parent: String, format: OutputFormat) -> Result<()> {
    let workspace = Workspace::open(cd.as_deref())?;
    let parent_path = resource_path(&raw_parent)?;
    let session = workspace.session()?;
    let chain = &workspace.chain;

    let parent = ResourceRef::new(&session, parent_path);
    let items: Vec<CollectionItemView> = chain
        .collection_items(&parent)
        .into_iter()
        .map(|child| {
            let resolved = chain.resolve_resource_or_identity(&child, ConfigRole::CollectionItem);
            CollectionItemView {
                name: child.name().to_string(),
                properties: resolved.properties().unwrap_or_default(),
                path: resolved.into_path(),
            }
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Text => {
            if items.is_empty() {
                eprintln!("No items below {}", parent.path());
            }
            for item in &items {
                println!("{}\t{}\t{}", item.name, item.path, item.properties.len());
            }
        }
    }
    Ok(())
}

pub(crate) fn handle_set(cd: Option<String>, raw_path: String, assignments: Vec<String>) -> Result<()> {
    let workspace = Workspace::open(cd.as_deref())?;
    let path = resource_path(&raw_path)?;
    let mut properties = PropertyMap::new();
    for raw in &assignments {
        let (key, value) = parse_assignment(raw)?;
        properties.insert(key, value);
    }

    let data = ItemPersistData::new(properties);
    write_and_commit(&workspace, |chain, session| {
        chain.persist_singleton_required(session, &path, &data)
    })?;
    eprintln!("Stored {} properties at {}", data.properties().len(), path);
    Ok(())
}

pub(crate) fn handle_set_collection(
    cd: Option<String>,
    raw_parent: String,
    file: &Path,
) -> Result<()> {
    let workspace = Workspace::open(cd.as_deref())?;
    let parent = resource_path(&raw_parent)?;
    let (items, properties) = CollectionFile::load(file)?.into_items();

    let policy = build_name_policy(&workspace.config)?;
    // Rejected before any store access.
    let mut data = CollectionPersistData::with_policy(items, policy.as_ref())?;
    if let Some(properties) = properties {
        data = data.properties(properties);
    }

    write_and_commit(&workspace, |chain, session| {
        chain.persist_collection_required(session, &parent, &data)
    })?;
    eprintln!("Stored {} items below {}", data.len(), parent);
    Ok(())
}

pub(crate) fn handle_delete(cd: Option<String>, raw_path: String) -> Result<()> {
    let workspace = Workspace::open(cd.as_deref())?;
    let path = resource_path(&raw_path)?;
    write_and_commit(&workspace, |chain, session| chain.delete_required(session, &path))?;
    eprintln!("Deleted {path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_file_keeps_item_order_and_missing_names() {
        let file: CollectionFile = toml::from_str(
            r#"
            [properties]
            title = "links"

            [[items]]
            name = "b"
            [items.properties]
            url = "https://b.example"

            [[items]]
            name = "a"

            [[items]]
            [items.properties]
            orphan = true
        "#,
        )
        .unwrap();

        let (items, properties) = file.into_items();
        assert_eq!(
            properties.unwrap().get("title").and_then(|v| v.as_str()),
            Some("links")
        );
        let names: Vec<Option<&str>> = items.iter().map(|i| i.item_name()).collect();
        assert_eq!(names, vec![Some("b"), Some("a"), None]);
        assert_eq!(items[0].properties().len(), 1);
        assert!(items[1].properties().is_empty());
    }

    #[test]
    fn empty_collection_file_is_allowed() {
        let file: CollectionFile = toml::from_str("").unwrap();
        let (items, properties) = file.into_items();
        assert!(items.is_empty());
        assert!(properties.is_none());
    }
}
