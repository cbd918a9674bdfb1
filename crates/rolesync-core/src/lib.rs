//! # rolesync-core
//!
//! Object model shared by the RoleSync crates: object metadata, owner
//! references and the ownership predicate, plus the typed objects the
//! controller reads (`ProviderRevision`, `CustomResourceDefinition`) and
//! writes (`ClusterRole`).

pub mod crd;
pub mod error;
pub mod meta;
pub mod rbac;
pub mod resource;
pub mod revision;

pub use crd::{
    CustomResourceDefinition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
    ResourceScope,
};
pub use error::{CoreError, Result};
pub use meta::{
    GroupVersionKind, ObjectKey, ObjectMeta, OwnerReference, Uid, as_controller, controller_of,
    controller_refs, is_controlled_by, set_controller_reference, typed_reference_to,
};
pub use rbac::{ClusterRole, PolicyRule};
pub use resource::{DynamicObject, Resource};
pub use revision::{
    PackageRevisionDesiredState, ProviderRevision, ProviderRevisionSpec, ProviderRevisionStatus,
};
