//! In-memory object store backend for RoleSync.
//!
//! This crate provides an in-memory implementation of the `ObjectStore`
//! trait from `rolesync-storage`, using a `DashMap` so that every write is
//! an atomic check-and-set on its key.
//!
//! # Example
//!
//! ```ignore
//! use rolesync_db_memory::InMemoryStore;
//! use rolesync_storage::Client;
//!
//! let client = Client::new(std::sync::Arc::new(InMemoryStore::new()));
//! let stored = client.create(&role).await?;
//! assert!(stored.metadata.resource_version.is_some());
//! ```

mod store_impl;
pub mod storage;

pub use rolesync_storage::{DynStore, ObjectStore, StorageError};
pub use storage::{InMemoryStore, StorageKey};

/// Creates a new shareable in-memory store.
pub fn create_store() -> DynStore {
    std::sync::Arc::new(InMemoryStore::new())
}
