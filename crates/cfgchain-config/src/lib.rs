//! Chain configuration loading and validation (.cfgchain/config.toml).

pub mod config;
pub mod init;
pub mod paths;
pub mod runtime;
pub mod validate;

pub use config::{
    ChainConfig, DetectorConfig, NamePolicyKind, NamingConfig, StoreConfig, StrategyConfig,
};
pub use init::init_project;
pub use runtime::{build_chain, build_detectors, build_name_policy};
pub use validate::{validate_chain_config, validate_config};
