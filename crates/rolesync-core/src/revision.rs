//! Provider revisions: versioned deployment units that own the resource
//! types they install.

use serde::{Deserialize, Serialize};

use crate::meta::{GroupVersionKind, ObjectMeta};
use crate::rbac::PolicyRule;
use crate::resource::Resource;

pub const PROVIDER_REVISION_GROUP: &str = "pkg.rolesync.io";
pub const PROVIDER_REVISION_VERSION: &str = "v1alpha1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageRevisionDesiredState {
    #[default]
    Inactive,
    Active,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRevisionSpec {
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub revision: i64,
    #[serde(default)]
    pub desired_state: PackageRevisionDesiredState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRevisionStatus {
    /// Extra permissions the provider asked for beyond its own resource types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permission_requests: Vec<PolicyRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRevision {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ProviderRevisionSpec,
    #[serde(default)]
    pub status: ProviderRevisionStatus,
}

impl ProviderRevision {
    pub fn gvk() -> GroupVersionKind {
        GroupVersionKind::new(PROVIDER_REVISION_GROUP, PROVIDER_REVISION_VERSION, Self::KIND)
    }
}

impl Resource for ProviderRevision {
    const API_VERSION: &'static str = "pkg.rolesync.io/v1alpha1";
    const KIND: &'static str = "ProviderRevision";

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
