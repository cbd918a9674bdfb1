//! Typed access to an [`ObjectStore`](crate::ObjectStore).

use rolesync_core::{DynamicObject, ObjectKey, Resource};

use crate::error::StorageError;
use crate::types::ListParams;
use crate::DynStore;

/// Typed facade over a shared store. Decoding failures surface as
/// [`StorageError::InvalidObject`].
#[derive(Clone)]
pub struct Client {
    store: DynStore,
}

impl Client {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// The underlying untyped store.
    pub fn store(&self) -> &DynStore {
        &self.store
    }

    pub async fn get<T: Resource>(&self, key: &ObjectKey) -> Result<T, StorageError> {
        let object = self.store.get(T::KIND, key).await?;
        Ok(object.into_resource()?)
    }

    pub async fn list<T: Resource>(&self, params: &ListParams) -> Result<Vec<T>, StorageError> {
        self.store
            .list(T::KIND, params)
            .await?
            .into_iter()
            .map(|object| object.into_resource().map_err(StorageError::from))
            .collect()
    }

    pub async fn create<T: Resource>(&self, resource: &T) -> Result<T, StorageError> {
        let object = DynamicObject::from_resource(resource)?;
        Ok(self.store.create(&object).await?.into_resource()?)
    }

    pub async fn update<T: Resource>(&self, resource: &T) -> Result<T, StorageError> {
        let object = DynamicObject::from_resource(resource)?;
        Ok(self.store.update(&object).await?.into_resource()?)
    }

    pub async fn delete<T: Resource>(&self, key: &ObjectKey) -> Result<(), StorageError> {
        self.store.delete(T::KIND, key).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}
