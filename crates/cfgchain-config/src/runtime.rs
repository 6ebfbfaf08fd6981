//! Turn a loaded [`ChainConfig`] into live strategy and detector chains.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use cfgchain_core::{NamePolicy, PatternNamePolicy, SegmentNamePolicy};
use cfgchain_persist::{
    AttributeDetector, ConfigRefDetector, ContextResourceDetector, DetectorChain,
    DirectPersistenceStrategy, NestedContentStrategy, PersistenceStrategy, StrategyChain,
};
use tracing::debug;

use crate::config::{ChainConfig, NamePolicyKind, StrategyConfig};

/// Enabled strategies in configured order.
pub fn build_chain(config: &ChainConfig) -> StrategyChain {
    let strategies: Vec<Arc<dyn PersistenceStrategy>> = config
        .enabled_strategies()
        .map(|entry| -> Arc<dyn PersistenceStrategy> {
            match entry {
                StrategyConfig::NestedContent {
                    content_node,
                    path_prefix,
                    ..
                } => {
                    let strategy = NestedContentStrategy::new(content_node.clone());
                    match path_prefix {
                        Some(prefix) => Arc::new(strategy.with_path_prefix(prefix.clone())),
                        None => Arc::new(strategy),
                    }
                }
                StrategyConfig::Direct { .. } => Arc::new(DirectPersistenceStrategy),
            }
        })
        .collect();
    let chain = StrategyChain::new(strategies);
    debug!(strategies = ?chain.names(), "strategy chain built");
    chain
}

pub fn build_name_policy(config: &ChainConfig) -> Result<Arc<dyn NamePolicy>> {
    let naming = &config.naming;
    match naming.policy {
        NamePolicyKind::Segment => Ok(Arc::new(SegmentNamePolicy::new(
            naming.max_length,
            naming.case_insensitive,
        ))),
        NamePolicyKind::Pattern => {
            let Some(pattern) = naming.pattern.as_deref() else {
                bail!("naming.policy = \"pattern\" requires naming.pattern");
            };
            let policy =
                PatternNamePolicy::new(pattern, naming.max_length, naming.case_insensitive)
                    .with_context(|| format!("Invalid naming.pattern '{pattern}'"))?;
            Ok(Arc::new(policy))
        }
    }
}

/// Explicit attribute first, then the reference-property walk.
pub fn build_detectors(config: &ChainConfig) -> DetectorChain {
    DetectorChain::new(vec![
        Arc::new(AttributeDetector::new(config.detector.attribute.clone()))
            as Arc<dyn ContextResourceDetector>,
        Arc::new(ConfigRefDetector::new(
            config.detector.config_ref_property.clone(),
        )),
    ])
}
