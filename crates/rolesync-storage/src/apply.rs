//! Create-or-update writes guarded by ownership preconditions.

use std::sync::Arc;

use async_trait::async_trait;
use rolesync_core::{DynamicObject, Uid, controller_refs, is_controlled_by};

use crate::error::{ErrorCategory, StorageError};
use crate::DynStore;

/// Errors returned by an [`Applicator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// The stored object is controlled by someone else. Nothing was written.
    #[error("existing {kind} {key} is not controlled by UID {uid}")]
    NotControllable { kind: String, key: String, uid: Uid },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApplyError {
    pub fn not_controllable(object: &DynamicObject, uid: &Uid) -> Self {
        Self::NotControllable {
            kind: object.kind.clone(),
            key: object.key().to_string(),
            uid: uid.clone(),
        }
    }

    pub fn is_not_controllable(&self) -> bool {
        matches!(self, Self::NotControllable { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_cancelled())
    }

    /// Returns the error category for logging/monitoring purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotControllable { .. } => ErrorCategory::Conflict,
            Self::Storage(e) => e.category(),
        }
    }
}

/// A precondition evaluated against the object currently in the store,
/// immediately before it is overwritten.
pub trait ApplyOption: Send + Sync {
    fn check(&self, current: &DynamicObject, desired: &DynamicObject) -> Result<(), ApplyError>;
}

/// Allows the write only if the stored object has no controller, or is
/// already controlled by `uid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MustBeControllableBy {
    uid: Uid,
}

impl MustBeControllableBy {
    pub fn new(uid: impl Into<Uid>) -> Self {
        Self { uid: uid.into() }
    }
}

impl ApplyOption for MustBeControllableBy {
    fn check(&self, current: &DynamicObject, _desired: &DynamicObject) -> Result<(), ApplyError> {
        let refs = &current.metadata.owner_references;
        if controller_refs(refs).next().is_none() || is_controlled_by(refs, &self.uid) {
            return Ok(());
        }
        Err(ApplyError::not_controllable(current, &self.uid))
    }
}

/// Writes a desired object to the store.
#[async_trait]
pub trait Applicator: Send + Sync {
    /// Creates `object` if absent, otherwise overwrites the stored object
    /// once every option accepts it. Returns the object as stored.
    async fn apply(
        &self,
        object: DynamicObject,
        options: &[&dyn ApplyOption],
    ) -> Result<DynamicObject, ApplyError>;
}

/// Type alias for a shared applicator trait object.
pub type DynApplicator = Arc<dyn Applicator>;

/// Applies objects with a fresh read followed by a full update.
///
/// The update carries the resource version of the read, so a concurrent
/// writer between the read and the write makes the store reject it with a
/// version conflict rather than losing either update.
#[derive(Clone)]
pub struct ApiUpdatingApplicator {
    store: DynStore,
}

impl ApiUpdatingApplicator {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }
}

/// Returns `true` if writing `desired` over `current` would change nothing
/// the caller controls.
fn content_matches(current: &DynamicObject, desired: &DynamicObject) -> bool {
    current.api_version == desired.api_version
        && current.metadata.labels == desired.metadata.labels
        && current.metadata.annotations == desired.metadata.annotations
        && current.metadata.owner_references == desired.metadata.owner_references
        && current.data == desired.data
}

#[async_trait]
impl Applicator for ApiUpdatingApplicator {
    async fn apply(
        &self,
        mut object: DynamicObject,
        options: &[&dyn ApplyOption],
    ) -> Result<DynamicObject, ApplyError> {
        let key = object.key();

        let current = match self.store.get(&object.kind, &key).await {
            Ok(current) => current,
            Err(e) if e.is_not_found() => {
                object.metadata.resource_version = None;
                let created = self.store.create(&object).await?;
                tracing::debug!(kind = %created.kind, key = %key, "Created object");
                return Ok(created);
            }
            Err(e) => return Err(e.into()),
        };

        for option in options {
            option.check(&current, &object)?;
        }

        if content_matches(&current, &object) {
            tracing::trace!(kind = %current.kind, key = %key, "Object already up to date");
            return Ok(current);
        }

        object.metadata.resource_version = current.metadata.resource_version.clone();
        object.metadata.uid = current.metadata.uid.clone();
        object.metadata.creation_timestamp = current.metadata.creation_timestamp;

        let updated = self.store.update(&object).await?;
        tracing::debug!(
            kind = %updated.kind,
            key = %key,
            resource_version = ?updated.metadata.resource_version,
            "Updated object"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolesync_core::{ObjectMeta, OwnerReference};

    fn object_with_owners(owners: Vec<OwnerReference>) -> DynamicObject {
        let mut meta = ObjectMeta::named("role");
        meta.owner_references = owners;
        DynamicObject::new("rbac.authorization.k8s.io/v1", "ClusterRole", meta)
    }

    fn owner(uid: &str, controller: bool) -> OwnerReference {
        OwnerReference {
            uid: Uid::from(uid),
            controller: Some(controller),
            ..Default::default()
        }
    }

    #[test]
    fn test_must_be_controllable_by_allows_uncontrolled() {
        let option = MustBeControllableBy::new("a");
        let desired = object_with_owners(vec![]);

        assert!(option.check(&object_with_owners(vec![]), &desired).is_ok());
        assert!(
            option
                .check(&object_with_owners(vec![owner("b", false)]), &desired)
                .is_ok()
        );
    }

    #[test]
    fn test_must_be_controllable_by_allows_own_controller() {
        let option = MustBeControllableBy::new("a");
        let current = object_with_owners(vec![owner("a", true)]);
        assert!(option.check(&current, &object_with_owners(vec![])).is_ok());
    }

    #[test]
    fn test_must_be_controllable_by_rejects_other_controller() {
        let option = MustBeControllableBy::new("b");
        let current = object_with_owners(vec![owner("a", true)]);

        let err = option.check(&current, &object_with_owners(vec![])).unwrap_err();
        assert!(err.is_not_controllable());
        assert_eq!(
            err.to_string(),
            "existing ClusterRole role is not controlled by UID b"
        );
    }

    #[test]
    fn test_must_be_controllable_by_rejects_ambiguous_controllers() {
        let option = MustBeControllableBy::new("a");
        let current = object_with_owners(vec![owner("a", true), owner("b", true)]);
        assert!(option.check(&current, &object_with_owners(vec![])).is_err());
    }

    #[test]
    fn test_apply_error_predicates() {
        let err = ApplyError::from(StorageError::cancelled("deadline"));
        assert!(err.is_cancelled());
        assert!(!err.is_not_controllable());

        let err = ApplyError::from(StorageError::connection_error("refused"));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_apply_error_category() {
        let current = object_with_owners(vec![owner("a", true)]);
        let err = ApplyError::not_controllable(&current, &Uid::from("b"));
        assert_eq!(err.category(), ErrorCategory::Conflict);

        let err = ApplyError::from(StorageError::version_conflict("1", "2"));
        assert_eq!(err.category(), ErrorCategory::Conflict);

        let err = ApplyError::from(StorageError::connection_error("refused"));
        assert_eq!(err.category(), ErrorCategory::Infrastructure);
    }

    #[test]
    fn test_content_matches_ignores_store_managed_fields() {
        let desired = object_with_owners(vec![owner("a", true)]);
        let mut current = desired.clone();
        current.metadata.resource_version = Some("4".to_string());
        current.metadata.uid = Uid::from("stored");
        assert!(content_matches(&current, &desired));

        current
            .data
            .insert("rules".to_string(), serde_json::json!([]));
        assert!(!content_matches(&current, &desired));
    }
}
