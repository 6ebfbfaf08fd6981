/// Failures raised by a store session while staging or committing changes.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Invalid resource path '{0}': expected an absolute, slash-delimited path")]
    InvalidPath(String),

    #[error("Cannot remove the root resource")]
    RootRemoval,

    #[error("Store I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode store document {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Failed to encode store document: {0}")]
    Encode(String),

    #[error("Failed to acquire store lock {path}: {message}")]
    Lock { path: String, message: String },
}

/// Failures raised while validating or persisting configuration data.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("Missing collection item name (item #{index})")]
    MissingItemName { index: usize },

    #[error("Duplicate collection item name '{name}' (item #{index}, first seen at item #{first_index})")]
    DuplicateItemName {
        name: String,
        index: usize,
        first_index: usize,
    },

    #[error("Invalid collection item name '{name}' (item #{index}): {reason}")]
    InvalidItemName {
        name: String,
        index: usize,
        reason: String,
    },

    #[error("Persistence strategy '{strategy}' failed: {message}")]
    Strategy { strategy: String, message: String },

    #[error("No persistence strategy accepted {operation} for '{path}'")]
    Unhandled {
        operation: &'static str,
        path: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PersistError {
    /// Returns true for the errors raised while constructing a collection payload.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingItemName { .. }
                | Self::DuplicateItemName { .. }
                | Self::InvalidItemName { .. }
        )
    }
}
