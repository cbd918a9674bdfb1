//! Object metadata and ownership.
//!
//! Ownership is recorded as data on the owned object: each object carries a
//! list of [`OwnerReference`]s, at most one of which is flagged as the
//! controller. Nothing here holds a live reference to an owner.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Unique identifier assigned to an object by the store.
///
/// The UID is the ownership token compared by [`is_controlled_by`]. An empty
/// UID is a valid (if unusual) value and compares equal to another empty UID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Uid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identity of an object within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    /// Key for a cluster-scoped object.
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Key for a namespaced object.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Group, version and kind of a typed object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// `group/version`, or just `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

/// A back-reference from an owned object to one of its owners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_owner_deletion: Option<bool>,
}

impl OwnerReference {
    /// Returns `true` if this reference is flagged as the controller.
    pub fn is_controller(&self) -> bool {
        self.controller == Some(true)
    }
}

/// Metadata common to every stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Uid::is_empty")]
    pub uid: Uid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub creation_timestamp: Option<OffsetDateTime>,
    /// Present while the object is being torn down.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub deletion_timestamp: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    /// Metadata for a cluster-scoped object with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    pub fn is_being_deleted(&self) -> bool {
        self.deletion_timestamp.is_some()
    }
}

/// Iterates over the owner references flagged as controller.
pub fn controller_refs(refs: &[OwnerReference]) -> impl Iterator<Item = &OwnerReference> {
    refs.iter().filter(|r| r.is_controller())
}

/// Returns the controller reference if exactly one reference is flagged.
pub fn controller_of(refs: &[OwnerReference]) -> Option<&OwnerReference> {
    let mut controllers = controller_refs(refs);
    let first = controllers.next()?;
    match controllers.next() {
        Some(_) => None,
        None => Some(first),
    }
}

/// Returns `true` iff exactly one reference is flagged as controller and its
/// UID equals `uid`. Missing or mismatched controllers both mean "not owned".
pub fn is_controlled_by(refs: &[OwnerReference], uid: &Uid) -> bool {
    controller_of(refs).is_some_and(|c| &c.uid == uid)
}

/// Builds a (non-controller) reference to the object described by `meta`.
pub fn typed_reference_to(meta: &ObjectMeta, gvk: &GroupVersionKind) -> OwnerReference {
    OwnerReference {
        api_version: gvk.api_version(),
        kind: gvk.kind.clone(),
        name: meta.name.clone(),
        uid: meta.uid.clone(),
        controller: None,
        block_owner_deletion: None,
    }
}

/// Marks a reference as the controlling owner.
pub fn as_controller(mut reference: OwnerReference) -> OwnerReference {
    reference.controller = Some(true);
    reference.block_owner_deletion = Some(true);
    reference
}

/// Stamps `reference` as the sole controller of `meta`.
///
/// Other controller-flagged references are dropped; plain owner references
/// are kept. A reference with the same UID is replaced in place.
pub fn set_controller_reference(meta: &mut ObjectMeta, reference: OwnerReference) {
    meta.owner_references
        .retain(|r| !r.is_controller() || r.uid == reference.uid);

    match meta
        .owner_references
        .iter_mut()
        .find(|r| r.uid == reference.uid)
    {
        Some(existing) => *existing = reference,
        None => meta.owner_references.push(reference),
    }
}
