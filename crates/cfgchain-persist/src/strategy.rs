use cfgchain_core::{
    CollectionPersistData, ConfigRole, ItemPersistData, PersistError, ResourceRef, StoreSession,
    WriteOutcome,
};

/// One element of a persistence strategy chain.
///
/// A strategy decides where configuration data physically lives. Every
/// operation may decline: `None` for transforms, [`WriteOutcome::Declined`]
/// for writes. A declined call is handed to the next strategy in the chain.
///
/// Implementations hold no mutable state and are shared across threads.
pub trait PersistenceStrategy: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Transform a configuration resource for reading, e.g. look one level
    /// down for the node that actually holds the data.
    fn resolve_resource<'a>(
        &self,
        resource: &ResourceRef<'a>,
        role: ConfigRole,
    ) -> Option<ResourceRef<'a>>;

    /// Same transform as [`resolve_resource`](Self::resolve_resource) on a
    /// full path, for locations that may not exist yet.
    fn resolve_path(&self, path: &str, role: ConfigRole) -> Option<String>;

    /// Transform the name of a nested configuration.
    ///
    /// `related_path` is the path of a configuration resource already resolved
    /// for this name; strategies use it to check they apply. `None` means
    /// "assume it matches".
    fn resolve_config_name(
        &self,
        name: &str,
        related_path: Option<&str>,
        role: ConfigRole,
    ) -> Option<String>;

    /// Stage a singleton write at `path`. All existing properties there are
    /// replaced. Missing nodes are created. Never commits.
    fn persist_singleton(
        &self,
        store: &mut dyn StoreSession,
        path: &str,
        data: &ItemPersistData,
    ) -> Result<WriteOutcome, PersistError>;

    /// Stage a collection write below `parent_path`: afterwards the collection
    /// holds exactly `data.items()`. Never commits.
    fn persist_collection(
        &self,
        store: &mut dyn StoreSession,
        parent_path: &str,
        data: &CollectionPersistData,
    ) -> Result<WriteOutcome, PersistError>;

    /// Stage removal of the configuration anchored at `path`, including any
    /// nested structure this strategy uses for it. Never commits.
    fn delete(&self, store: &mut dyn StoreSession, path: &str)
    -> Result<WriteOutcome, PersistError>;

    /// Child this strategy keeps below collection parents for its own data.
    /// It is never a collection item.
    fn reserved_child_name(&self) -> Option<&str> {
        None
    }
}
