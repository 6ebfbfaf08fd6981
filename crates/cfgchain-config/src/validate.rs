use anyhow::{Result, bail};
use std::path::Path;

use cfgchain_core::{NamePolicy, SegmentNamePolicy, path};

use crate::config::{ChainConfig, NamePolicyKind, StrategyConfig};
use crate::runtime::build_name_policy;

/// Validate a project configuration file.
/// Returns Ok(()) if valid, or Err with descriptive messages.
pub fn validate_config(project_root: &Path) -> Result<()> {
    let config = ChainConfig::load(project_root)?;
    validate_loaded_config(config)
}

/// Validate config loaded with explicit paths (bypasses user-level fallback).
#[cfg(test)]
pub(crate) fn validate_config_with_paths(
    user_path: Option<&Path>,
    project_path: &Path,
) -> Result<()> {
    let config = ChainConfig::load_with_paths(user_path, project_path)?;
    validate_loaded_config(config)
}

fn validate_loaded_config(config: Option<ChainConfig>) -> Result<()> {
    let config = match config {
        Some(c) => c,
        None => bail!("No configuration found. Run `cfgchain config init` first."),
    };
    validate_chain_config(&config)
}

/// Validate an in-memory configuration.
pub fn validate_chain_config(config: &ChainConfig) -> Result<()> {
    config.check_schema_version()?;
    validate_strategies(config)?;
    validate_naming(config)?;
    validate_detector(config)?;
    Ok(())
}

fn validate_strategies(config: &ChainConfig) -> Result<()> {
    // Messages use the index within [[strategies]], disabled entries included.
    let enabled: Vec<(usize, &StrategyConfig)> = config
        .strategies
        .iter()
        .enumerate()
        .filter(|(_, strategy)| strategy.is_enabled())
        .collect();
    if enabled.is_empty() {
        bail!("At least one enabled [[strategies]] entry is required");
    }

    let segment = SegmentNamePolicy::default();
    for (position, (index, strategy)) in enabled.iter().enumerate() {
        match strategy {
            StrategyConfig::NestedContent {
                content_node,
                path_prefix,
                ..
            } => {
                if let Err(reason) = segment.check(content_node) {
                    bail!(
                        "strategies[{}].content_node '{}' is not a valid node name: {}",
                        index,
                        content_node,
                        reason
                    );
                }
                if let Some(prefix) = path_prefix {
                    if path::normalize(prefix).is_err() {
                        bail!(
                            "strategies[{}].path_prefix '{}' must be an absolute resource path",
                            index,
                            prefix
                        );
                    }
                }
            }
            StrategyConfig::Direct { .. } => {
                // Accept-all: nothing after it would ever run.
                let following = enabled.len() - position - 1;
                if following != 0 {
                    bail!(
                        "strategies[{}]: 'direct' accepts every operation and must be the last \
                         enabled strategy ({} more follow)",
                        index,
                        following
                    );
                }
            }
        }
    }
    Ok(())
}

fn validate_naming(config: &ChainConfig) -> Result<()> {
    if config.naming.max_length == 0 {
        bail!("naming.max_length must be > 0 (got 0)");
    }
    if config.naming.policy == NamePolicyKind::Segment && config.naming.pattern.is_some() {
        tracing::warn!("naming.pattern is ignored unless naming.policy = \"pattern\"");
    }
    build_name_policy(config)?;
    Ok(())
}

fn validate_detector(config: &ChainConfig) -> Result<()> {
    if config.detector.config_ref_property.trim().is_empty() {
        bail!("detector.config_ref_property cannot be empty");
    }
    if config.detector.attribute.trim().is_empty() {
        bail!("detector.attribute cannot be empty");
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
