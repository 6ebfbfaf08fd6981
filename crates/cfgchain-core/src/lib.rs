//! Shared vocabulary for the configuration persistence strategy chain:
//! resource paths, the store session contract, persist payloads and the
//! collection item name rules.

pub mod error;
pub mod name;
pub mod path;
pub mod persist_data;
pub mod store;
pub mod types;

pub use error::{PersistError, StoreError};
pub use name::{NamePolicy, PatternNamePolicy, SegmentNamePolicy};
pub use persist_data::{CollectionPersistData, ItemPersistData};
pub use store::{ResourceRef, ResourceTree, StoreSession};
pub use types::{ConfigRole, OutputFormat, PropertyMap, PropertyValue, WriteOutcome};
