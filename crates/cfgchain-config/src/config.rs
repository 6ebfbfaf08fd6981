use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use cfgchain_core::name::DEFAULT_MAX_NAME_LENGTH;
use cfgchain_persist::detect::{DEFAULT_CONFIG_REF_PROPERTY, DEFAULT_CONTEXT_ATTRIBUTE};
use cfgchain_persist::DEFAULT_CONTENT_NODE;

use crate::paths;

/// Current schema version for config.toml
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "StoreConfig::is_default")]
    pub store: StoreConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Ordered strategy chain. The first accepting strategy wins.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyConfig>,
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

fn default_strategies() -> Vec<StrategyConfig> {
    vec![StrategyConfig::Direct { enabled: true }]
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            store: StoreConfig::default(),
            naming: NamingConfig::default(),
            detector: DetectorConfig::default(),
            strategies: default_strategies(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store document location. Relative paths are resolved against the
    /// project root; unset means `.cfgchain/store.toml`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn is_default(&self) -> bool {
        self.path.is_none()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamePolicyKind {
    /// ASCII letters, digits, `-`, `_` and `.` in a single path segment.
    #[default]
    Segment,
    /// Names must match the regex in `naming.pattern`.
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default)]
    pub policy: NamePolicyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Treat names differing only in ASCII case as duplicates.
    #[serde(default)]
    pub case_insensitive: bool,
}

fn default_max_length() -> usize {
    DEFAULT_MAX_NAME_LENGTH
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            policy: NamePolicyKind::default(),
            pattern: None,
            max_length: default_max_length(),
            case_insensitive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_config_ref_property")]
    pub config_ref_property: String,
    #[serde(default = "default_attribute")]
    pub attribute: String,
}

fn default_config_ref_property() -> String {
    DEFAULT_CONFIG_REF_PROPERTY.to_string()
}

fn default_attribute() -> String {
    DEFAULT_CONTEXT_ATTRIBUTE.to_string()
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            config_ref_property: default_config_ref_property(),
            attribute: default_attribute(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StrategyConfig {
    NestedContent {
        #[serde(default = "default_content_node")]
        content_node: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path_prefix: Option<String>,
        #[serde(default = "default_true")]
        enabled: bool,
    },
    Direct {
        #[serde(default = "default_true")]
        enabled: bool,
    },
}

fn default_content_node() -> String {
    DEFAULT_CONTENT_NODE.to_string()
}

fn default_true() -> bool {
    true
}

impl StrategyConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NestedContent { .. } => "nested-content",
            Self::Direct { .. } => "direct",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Self::NestedContent { enabled, .. } | Self::Direct { enabled } => *enabled,
        }
    }
}

/// Lay `overlay` over `base` in place. Keys present in both tables are
/// combined key by key; anything else in `overlay`, including a
/// `[[strategies]]` list, replaces what `base` had.
pub(crate) fn overlay_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => overlay_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn read_toml(path: &Path, label: &str) -> Result<toml::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {label} config: {}", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("Failed to parse {label} config: {}", path.display()))
}

fn schema_version_of(value: &toml::Value) -> Option<i64> {
    value.get("schema_version").and_then(toml::Value::as_integer)
}

impl ChainConfig {
    /// Configuration for `project_root`, or `None` when neither the user
    /// file (`~/.config/cfgchain/config.toml`) nor the project file
    /// (`.cfgchain/config.toml`) exists. With both present the project file
    /// is laid over the user file.
    pub fn load(project_root: &Path) -> Result<Option<Self>> {
        let project_path = Self::config_path(project_root);
        let user_path = Self::user_config_path();
        Self::load_with_paths(user_path.as_deref(), &project_path)
    }

    /// Like [`load`](Self::load), falling back to defaults when no config exists.
    pub fn load_or_default(project_root: &Path) -> Result<Self> {
        Ok(Self::load(project_root)?.unwrap_or_default())
    }

    pub(crate) fn load_with_paths(
        user_path: Option<&Path>,
        project_path: &Path,
    ) -> Result<Option<Self>> {
        let user_path = user_path.filter(|p| p.exists());
        if !project_path.exists() {
            return user_path
                .map(|user| Self::from_value(read_toml(user, "user")?, user))
                .transpose();
        }
        let config = match user_path {
            Some(user) => Self::load_layered(user, project_path)?,
            None => Self::from_value(read_toml(project_path, "project")?, project_path)?,
        };
        Ok(Some(config))
    }

    /// Project over user. The schema version is the higher of the two, so a
    /// user file written by a newer binary is still refused.
    fn load_layered(user_path: &Path, project_path: &Path) -> Result<Self> {
        let mut merged = read_toml(user_path, "user")?;
        let project = read_toml(project_path, "project")?;
        let version = schema_version_of(&merged).max(schema_version_of(&project));

        overlay_toml(&mut merged, project);
        if let (Some(version), toml::Value::Table(table)) = (version, &mut merged) {
            table.insert("schema_version".to_string(), toml::Value::Integer(version));
        }
        Self::from_value(merged, project_path)
    }

    fn from_value(value: toml::Value, origin: &Path) -> Result<Self> {
        let text = toml::to_string(&value)
            .with_context(|| format!("Failed to encode config from {}", origin.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Invalid config in {}", origin.display()))
    }

    /// Path to user-level config: `~/.config/cfgchain/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        paths::config_dir().map(|dir| dir.join(paths::CONFIG_FILE))
    }

    /// Get the config file path for a project root
    pub fn config_path(project_root: &Path) -> PathBuf {
        paths::project_config_path(project_root)
    }

    /// Refuse configs written for a newer schema.
    pub fn check_schema_version(&self) -> Result<()> {
        anyhow::ensure!(
            self.schema_version <= CURRENT_SCHEMA_VERSION,
            "Config schema version {} is newer than this binary supports (v{})",
            self.schema_version,
            CURRENT_SCHEMA_VERSION
        );
        Ok(())
    }

    /// Save config to .cfgchain/config.toml
    pub fn save(&self, project_root: &Path) -> Result<()> {
        let config_path = Self::config_path(project_root);
        if let Some(dir) = config_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        Ok(())
    }

    /// Store document location for `project_root`.
    pub fn store_path(&self, project_root: &Path) -> PathBuf {
        match &self.store.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => project_root.join(path),
            None => paths::default_store_path(project_root),
        }
    }

    pub fn enabled_strategies(&self) -> impl Iterator<Item = &StrategyConfig> {
        self.strategies.iter().filter(|s| s.is_enabled())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
