//! # rolesync-controller
//!
//! Keeps the cluster roles of every provider revision in line with the
//! custom resource definitions that revision controls.
//!
//! The entry point is [`Reconciler::reconcile`], a single-shot, level
//! triggered function of one revision key. Whatever watches the cluster
//! and schedules calls to it honours the returned [`Outcome`].

pub mod config;
pub mod reconcile;

pub use config::{ConfigError, ControllerConfig, ReconcilerConfig};
pub use reconcile::{
    ClusterRoleRenderer, DefaultRenderer, Outcome, ReconcileError, Reconciler, ReconcilerOptions,
    controlled_by, system_cluster_role_name,
};
