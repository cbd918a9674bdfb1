//! Reconciliation of provider revision permissions.
//!
//! - `filter`: which resource definitions a revision controls
//! - `roles`: the cluster roles derived from them
//! - `reconciler`: the state machine that converges the cluster

mod filter;
mod reconciler;
mod roles;

pub use filter::controlled_by;
pub use reconciler::{Outcome, ReconcileError, Reconciler, ReconcilerOptions};
pub use roles::{ClusterRoleRenderer, DefaultRenderer, system_cluster_role_name};
