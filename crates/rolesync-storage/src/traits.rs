//! Storage traits for the object store abstraction.

use async_trait::async_trait;
use rolesync_core::{DynamicObject, ObjectKey};

use crate::error::StorageError;
use crate::types::ListParams;

/// The contract every cluster object store backend implements.
///
/// Objects are addressed by kind plus [`ObjectKey`]. Writes use optimistic
/// concurrency: `update` compares `metadata.resource_version` against the
/// stored version and rejects stale writes with
/// [`StorageError::VersionConflict`]. Implementations must be thread-safe.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads an object.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no object of `kind` has `key`.
    async fn get(&self, kind: &str, key: &ObjectKey) -> Result<DynamicObject, StorageError>;

    /// Lists objects of a kind matching `params`, ordered by key.
    async fn list(
        &self,
        kind: &str,
        params: &ListParams,
    ) -> Result<Vec<DynamicObject>, StorageError>;

    /// Creates an object and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if an object with the same kind
    /// and key exists.
    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, StorageError>;

    /// Replaces an existing object and returns it as stored.
    ///
    /// If `object.metadata.resource_version` is set, the write only succeeds
    /// when it equals the stored version.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist.
    /// Returns `StorageError::VersionConflict` on a stale resource version.
    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, StorageError>;

    /// Deletes an object.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist.
    async fn delete(&self, kind: &str, key: &ObjectKey) -> Result<(), StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
