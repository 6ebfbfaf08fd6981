use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use cfgchain_config::{ChainConfig, build_chain, validate_chain_config};
use cfgchain_core::{PersistError, PropertyValue, StoreSession, path};
use cfgchain_persist::StrategyChain;
use cfgchain_store::{FileSession, FileStore};
use tracing::{debug, warn};

pub(crate) fn determine_project_root(cd: Option<&str>) -> Result<PathBuf> {
    let path = if let Some(cd_path) = cd {
        PathBuf::from(cd_path)
    } else {
        std::env::current_dir()?
    };

    path.canonicalize()
        .with_context(|| format!("Cannot access project directory: {}", path.display()))
}

/// Effective config, the chain built from it and the store it points at.
pub(crate) struct Workspace {
    pub config: ChainConfig,
    pub chain: StrategyChain,
    pub store: FileStore,
}

impl Workspace {
    pub fn open(cd: Option<&str>) -> Result<Self> {
        let project_root = determine_project_root(cd)?;
        Self::open_at(&project_root)
    }

    fn open_at(project_root: &Path) -> Result<Self> {
        let config = ChainConfig::load_or_default(project_root)?;
        validate_chain_config(&config).context("Invalid chain configuration")?;
        let chain = build_chain(&config);
        let store = FileStore::new(config.store_path(project_root));
        debug!(store = %store.path().display(), "workspace opened");
        Ok(Self {
            config,
            chain,
            store,
        })
    }

    pub fn session(&self) -> Result<FileSession> {
        self.store
            .session()
            .with_context(|| format!("Failed to open store {}", self.store.path().display()))
    }
}

/// Run `op` on a fresh session and commit. Any failure reverts the staged
/// changes before the error is returned.
pub(crate) fn write_and_commit<F>(workspace: &Workspace, op: F) -> Result<()>
where
    F: FnOnce(&StrategyChain, &mut FileSession) -> Result<(), PersistError>,
{
    let mut session = workspace.session()?;
    if let Err(e) = op(&workspace.chain, &mut session) {
        warn!(error = %e, "write failed, reverting session");
        session.revert();
        return Err(e.into());
    }
    if let Err(e) = session.commit() {
        session.revert();
        return Err(anyhow::Error::new(e).context("Failed to commit store"));
    }
    Ok(())
}

/// Validate and canonicalize a resource path given on the command line.
pub(crate) fn resource_path(raw: &str) -> Result<String> {
    Ok(path::normalize(raw)?)
}

/// Split `KEY=VALUE`, typing the value with [`PropertyValue::parse_literal`].
pub(crate) fn parse_assignment(raw: &str) -> Result<(String, PropertyValue)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Expected KEY=VALUE, got '{raw}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Empty key in '{raw}'");
    }
    Ok((key.to_string(), PropertyValue::parse_literal(value)))
}
