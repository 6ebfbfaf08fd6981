//! Store session implementations: a process-local [`MemoryStore`] and a
//! TOML document backed [`FileStore`].

pub mod file;
pub mod memory;
pub mod tree;

pub use file::{FileSession, FileStore, STORE_SCHEMA_VERSION};
pub use memory::{MemorySession, MemoryStore};
pub use tree::{Change, Node, Tree};
