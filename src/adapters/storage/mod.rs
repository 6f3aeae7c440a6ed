//! Storage adapters: in-memory sessions and the file-backed catalog.

mod catalog_file;
mod in_memory_session_store;

pub use catalog_file::load_catalog;
pub use in_memory_session_store::{InMemorySessionStore, SessionLimits};
