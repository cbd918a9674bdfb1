//! # rolesync-storage
//!
//! Object store abstraction for the RoleSync controller.
//!
//! This crate defines the contract a cluster object store must satisfy and
//! the write path built on top of it. It does not contain a backend; see
//! `rolesync-db-memory` for the in-memory one.
//!
//! ## Overview
//!
//! - [`ObjectStore`]: get / list / create / update / delete over untyped
//!   [`DynamicObject`](rolesync_core::DynamicObject)s, with optimistic
//!   concurrency on `metadata.resourceVersion`.
//! - [`Client`]: typed facade over a [`DynStore`].
//! - [`Applicator`]: create-or-update with [`ApplyOption`] preconditions,
//!   most importantly [`MustBeControllableBy`].
//!
//! ## Example
//!
//! ```ignore
//! use rolesync_storage::{ApiUpdatingApplicator, Applicator, MustBeControllableBy};
//!
//! let applicator = ApiUpdatingApplicator::new(store.clone());
//! let object = DynamicObject::from_resource(&role)?;
//! applicator
//!     .apply(object, &[&MustBeControllableBy::new(revision_uid)])
//!     .await?;
//! ```

mod apply;
mod client;
mod error;
mod traits;
mod types;

pub use apply::{
    ApiUpdatingApplicator, ApplyError, ApplyOption, Applicator, DynApplicator,
    MustBeControllableBy,
};
pub use client::Client;
pub use error::{ErrorCategory, StorageError};
pub use traits::ObjectStore;
pub use types::ListParams;

/// Type alias for a shared store trait object.
pub type DynStore = std::sync::Arc<dyn ObjectStore>;
