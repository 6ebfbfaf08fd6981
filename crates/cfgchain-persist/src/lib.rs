//! Persistence strategy chain.
//!
//! A [`StrategyChain`] holds an ordered list of [`PersistenceStrategy`]
//! implementations and hands every read transform and write to the first one
//! that accepts it. Two strategies ship with the crate:
//! [`NestedContentStrategy`] and the accept-all [`DirectPersistenceStrategy`].

pub mod chain;
pub mod detect;
pub mod direct;
pub mod nested;
pub mod strategy;
mod write;

pub use chain::StrategyChain;
pub use detect::{
    AttributeDetector, ConfigRefDetector, ContextRequest, ContextResourceDetector, DetectorChain,
};
pub use direct::{DIRECT_STRATEGY_NAME, DirectPersistenceStrategy};
pub use nested::{DEFAULT_CONTENT_NODE, NESTED_STRATEGY_NAME, NestedContentStrategy};
pub use strategy::PersistenceStrategy;
