//! Extension resource-type definitions.

use serde::{Deserialize, Serialize};

use crate::meta::ObjectMeta;
use crate::resource::Resource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceScope {
    #[default]
    Cluster,
    Namespaced,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinitionNames {
    pub kind: String,
    pub plural: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomResourceDefinitionSpec {
    pub group: String,
    pub names: CustomResourceDefinitionNames,
    #[serde(default)]
    pub scope: ResourceScope,
}

/// A cluster-wide schema extension, usually installed (and controlled) by a
/// provider revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomResourceDefinition {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: CustomResourceDefinitionSpec,
}

impl CustomResourceDefinition {
    /// Builds a definition named `<plural>.<group>`.
    pub fn new(
        group: impl Into<String>,
        kind: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        let group = group.into();
        let plural = plural.into();
        Self {
            metadata: ObjectMeta::named(format!("{plural}.{group}")),
            spec: CustomResourceDefinitionSpec {
                group,
                names: CustomResourceDefinitionNames {
                    kind: kind.into(),
                    plural,
                    singular: None,
                    list_kind: None,
                },
                scope: ResourceScope::Cluster,
            },
        }
    }
}

impl Resource for CustomResourceDefinition {
    const API_VERSION: &'static str = "apiextensions.k8s.io/v1";
    const KIND: &'static str = "CustomResourceDefinition";

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
