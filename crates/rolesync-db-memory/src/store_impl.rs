//! Implementation of the ObjectStore trait for InMemoryStore.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use rolesync_core::{DynamicObject, ObjectKey, Uid};
use rolesync_storage::{ListParams, ObjectStore, StorageError};
use time::OffsetDateTime;

use crate::storage::{InMemoryStore, make_storage_key};

fn require_name(object: &DynamicObject) -> Result<(), StorageError> {
    if object.metadata.name.is_empty() {
        return Err(StorageError::invalid_object(format!(
            "{} is missing metadata.name",
            object.kind
        )));
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get(&self, kind: &str, key: &ObjectKey) -> Result<DynamicObject, StorageError> {
        self.data
            .get(&make_storage_key(kind, key))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found(kind, key))
    }

    async fn list(
        &self,
        kind: &str,
        params: &ListParams,
    ) -> Result<Vec<DynamicObject>, StorageError> {
        let mut objects: Vec<DynamicObject> = self
            .data
            .iter()
            .filter(|entry| entry.value().kind == kind && params.matches(&entry.value().metadata))
            .map(|entry| entry.value().clone())
            .collect();
        objects.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(objects)
    }

    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, StorageError> {
        require_name(object)?;
        let key = object.key();

        match self.data.entry(make_storage_key(&object.kind, &key)) {
            Entry::Occupied(_) => Err(StorageError::already_exists(&object.kind, &key)),
            Entry::Vacant(slot) => {
                let mut stored = object.clone();
                if stored.metadata.uid.is_empty() {
                    stored.metadata.uid = Uid::new(uuid::Uuid::new_v4().to_string());
                }
                stored.metadata.resource_version = Some(self.next_version());
                stored.metadata.creation_timestamp = Some(OffsetDateTime::now_utc());
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, StorageError> {
        require_name(object)?;
        let key = object.key();

        match self.data.entry(make_storage_key(&object.kind, &key)) {
            Entry::Vacant(_) => Err(StorageError::not_found(&object.kind, &key)),
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                let actual = current.metadata.resource_version.clone().unwrap_or_default();
                if let Some(expected) = &object.metadata.resource_version {
                    if *expected != actual {
                        return Err(StorageError::version_conflict(expected.clone(), actual));
                    }
                }

                let mut stored = object.clone();
                stored.metadata.uid = current.metadata.uid.clone();
                stored.metadata.creation_timestamp = current.metadata.creation_timestamp;
                stored.metadata.resource_version = Some(self.next_version());
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn delete(&self, kind: &str, key: &ObjectKey) -> Result<(), StorageError> {
        self.data
            .remove(&make_storage_key(kind, key))
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(kind, key))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolesync_core::ObjectMeta;

    fn role(name: &str) -> DynamicObject {
        DynamicObject::new("rbac.authorization.k8s.io/v1", "ClusterRole", ObjectMeta::named(name))
    }

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let store = InMemoryStore::new();
        let created = store.create(&role("viewer")).await.unwrap();

        assert!(!created.metadata.uid.is_empty());
        assert!(created.metadata.resource_version.is_some());
        assert!(created.metadata.creation_timestamp.is_some());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_keeps_supplied_uid() {
        let store = InMemoryStore::new();
        let mut object = role("viewer");
        object.metadata.uid = Uid::from("fixed");

        let created = store.create(&object).await.unwrap();
        assert_eq!(created.metadata.uid.as_str(), "fixed");
    }

    #[tokio::test]
    async fn test_create_conflicts_and_not_found() {
        let store = InMemoryStore::new();
        store.create(&role("viewer")).await.unwrap();

        let err = store.create(&role("viewer")).await.unwrap_err();
        assert!(err.is_already_exists());

        let err = store
            .get("ClusterRole", &ObjectKey::cluster("missing"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = store.update(&role("missing")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let store = InMemoryStore::new();
        let err = store.create(&role("")).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidObject { .. }));
    }

    #[tokio::test]
    async fn test_update_checks_resource_version() {
        let store = InMemoryStore::new();
        let created = store.create(&role("viewer")).await.unwrap();

        let mut first = created.clone();
        first.data.insert("rules".to_string(), serde_json::json!([]));
        let updated = store.update(&first).await.unwrap();
        assert_ne!(updated.metadata.resource_version, created.metadata.resource_version);
        assert_eq!(updated.metadata.uid, created.metadata.uid);

        // `created` still carries the version the first writer read.
        let err = store.update(&created).await.unwrap_err();
        assert!(err.is_version_conflict());
    }

    #[tokio::test]
    async fn test_update_without_version_is_unconditional() {
        let store = InMemoryStore::new();
        store.create(&role("viewer")).await.unwrap();

        let mut object = role("viewer");
        object.data.insert("rules".to_string(), serde_json::json!([]));
        assert!(store.update(&object).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_filters_kind_and_sorts() {
        let store = InMemoryStore::new();
        store.create(&role("b")).await.unwrap();
        store.create(&role("a")).await.unwrap();
        store
            .create(&DynamicObject::new("v1", "ConfigMap", ObjectMeta::named("c")))
            .await
            .unwrap();

        let roles = store.list("ClusterRole", &ListParams::new()).await.unwrap();
        let names: Vec<_> = roles.iter().map(|o| o.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::new();
        store.create(&role("viewer")).await.unwrap();

        store
            .delete("ClusterRole", &ObjectKey::cluster("viewer"))
            .await
            .unwrap();
        assert!(store.is_empty());

        let err = store
            .delete("ClusterRole", &ObjectKey::cluster("viewer"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
