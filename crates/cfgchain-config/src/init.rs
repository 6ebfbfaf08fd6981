use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;

use crate::config::{ChainConfig, StrategyConfig};

/// Initialize project configuration under `.cfgchain/`.
///
/// With `nested` set the generated chain puts a `nested-content` strategy in
/// front of the `direct` fallback; otherwise it is `direct` only.
/// Refuses to overwrite an existing config.
pub fn init_project(project_root: &Path, nested: bool) -> Result<ChainConfig> {
    let config_path = ChainConfig::config_path(project_root);
    if config_path.exists() {
        bail!("Configuration already exists at {}", config_path.display());
    }

    let mut config = ChainConfig::default();
    if nested {
        config.strategies.insert(
            0,
            StrategyConfig::NestedContent {
                content_node: cfgchain_persist::DEFAULT_CONTENT_NODE.to_string(),
                path_prefix: None,
                enabled: true,
            },
        );
    }

    config.save(project_root)?;
    info!(path = %config_path.display(), "configuration initialized");
    Ok(config)
}
