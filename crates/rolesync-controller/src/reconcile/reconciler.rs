//! The provider revision RBAC state machine.

use std::sync::Arc;
use std::time::Duration;

use rolesync_core::{
    CustomResourceDefinition, DynamicObject, ObjectKey, ProviderRevision, Resource, as_controller,
    set_controller_reference, typed_reference_to,
};
use rolesync_storage::{
    ApiUpdatingApplicator, ApplyError, Client, DynApplicator, DynStore, ListParams,
    MustBeControllableBy, StorageError,
};

use super::filter::controlled_by;
use super::roles::{ClusterRoleRenderer, DefaultRenderer};
use crate::config::{ConfigError, ReconcilerConfig};

/// What the caller should do next with the key it just reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Converged, or nothing to converge. Wait for the next change.
    #[default]
    Done,
    /// Try again after the given delay.
    RequeueAfter(Duration),
}

/// Errors produced while reconciling a revision.
///
/// Only [`ReconcileError::GetRevision`] and [`ReconcileError::Cancelled`]
/// are returned from [`Reconciler::reconcile`]; list and apply failures are
/// logged and turned into a short requeue.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("cannot get provider revision: {source}")]
    GetRevision {
        #[source]
        source: StorageError,
    },

    #[error("cannot list custom resource definitions: {source}")]
    ListDefinitions {
        #[source]
        source: StorageError,
    },

    #[error("cannot apply cluster role {name}: {source}")]
    ApplyClusterRole {
        name: String,
        #[source]
        source: ApplyError,
    },

    #[error("reconcile cancelled")]
    Cancelled,
}

impl ReconcileError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Everything a [`Reconciler`] depends on.
#[derive(Clone)]
pub struct ReconcilerOptions {
    /// Source of revisions and resource definitions.
    pub store: DynStore,
    /// Write path for rendered cluster roles.
    pub applicator: DynApplicator,
    /// Maps a revision and its definitions to cluster roles.
    pub renderer: Arc<dyn ClusterRoleRenderer>,
    pub config: ReconcilerConfig,
}

impl ReconcilerOptions {
    /// Options backed by `store`, with the updating applicator, the default
    /// renderer and default timings.
    pub fn new(store: DynStore) -> Self {
        Self {
            applicator: Arc::new(ApiUpdatingApplicator::new(store.clone())),
            store,
            renderer: Arc::new(DefaultRenderer),
            config: ReconcilerConfig::default(),
        }
    }
}

/// Converges the cluster roles of one provider revision per call.
///
/// Holds no per-key state; concurrent calls for different keys are
/// independent. Calls for the same key must be serialized by the caller.
pub struct Reconciler {
    client: Client,
    applicator: DynApplicator,
    renderer: Arc<dyn ClusterRoleRenderer>,
    config: ReconcilerConfig,
}

impl Reconciler {
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `options.config` does not validate.
    pub fn new(options: ReconcilerOptions) -> Result<Self, ConfigError> {
        options.config.validate()?;
        Ok(Self {
            client: Client::new(options.store),
            applicator: options.applicator,
            renderer: options.renderer,
            config: options.config,
        })
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconciles the revision identified by `key`.
    ///
    /// Gives up with [`ReconcileError::Cancelled`] once the configured
    /// timeout elapses.
    #[tracing::instrument(name = "reconcile", skip_all, fields(revision = %key))]
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Outcome, ReconcileError> {
        match tokio::time::timeout(self.config.timeout(), self.reconcile_revision(key)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.config.timeout(), "Reconcile timed out");
                Err(ReconcileError::Cancelled)
            }
        }
    }

    async fn reconcile_revision(&self, key: &ObjectKey) -> Result<Outcome, ReconcileError> {
        let short_wait = Outcome::RequeueAfter(self.config.short_wait());

        let revision: ProviderRevision = match self.client.get(key).await {
            Ok(revision) => revision,
            Err(e) if e.is_not_found() => {
                tracing::debug!("Provider revision not found, nothing to do");
                return Ok(Outcome::Done);
            }
            Err(e) if e.is_cancelled() => return Err(ReconcileError::Cancelled),
            Err(source) => {
                let err = ReconcileError::GetRevision { source };
                tracing::debug!(error = %err, "Cannot reconcile");
                return Err(err);
            }
        };

        if revision.metadata.is_being_deleted() {
            tracing::debug!("Provider revision is being deleted, nothing to do");
            return Ok(Outcome::Done);
        }

        let crds: Vec<CustomResourceDefinition> = match self.client.list(&ListParams::new()).await {
            Ok(crds) => crds,
            Err(e) if e.is_cancelled() => return Err(ReconcileError::Cancelled),
            Err(source) => {
                let category = source.category();
                let err = ReconcileError::ListDefinitions { source };
                tracing::warn!(error = %err, %category, "Cannot reconcile, requeueing");
                return Ok(short_wait);
            }
        };

        let uid = &revision.metadata.uid;
        let owned = controlled_by(crds, uid);
        let roles = self.renderer.render(&revision, &owned);

        let controller = as_controller(typed_reference_to(
            &revision.metadata,
            &ProviderRevision::gvk(),
        ));
        let controllable = MustBeControllableBy::new(uid.clone());

        let mut applied = 0usize;
        let mut conflicts = 0usize;
        for mut role in roles {
            set_controller_reference(role.meta_mut(), controller.clone());
            let name = role.metadata.name.clone();

            let result = match DynamicObject::from_resource(&role) {
                Ok(object) => self.applicator.apply(object, &[&controllable]).await,
                Err(e) => Err(ApplyError::Storage(StorageError::from(e))),
            };

            match result {
                Ok(_) => {
                    applied += 1;
                    tracing::debug!(cluster_role = %name, "Applied cluster role");
                }
                // Left alone until whoever controls it releases it.
                Err(e) if e.is_not_controllable() => {
                    conflicts += 1;
                    tracing::warn!(
                        cluster_role = %name,
                        error = %e,
                        "Cluster role is controlled by another revision, skipping"
                    );
                }
                Err(e) if e.is_cancelled() => return Err(ReconcileError::Cancelled),
                Err(source) => {
                    let category = source.category();
                    let err = ReconcileError::ApplyClusterRole { name, source };
                    tracing::warn!(error = %err, %category, "Cannot reconcile, requeueing");
                    return Ok(short_wait);
                }
            }
        }

        tracing::info!(
            definitions = owned.len(),
            applied,
            conflicts,
            "Applied cluster roles"
        );
        Ok(Outcome::Done)
    }
}
