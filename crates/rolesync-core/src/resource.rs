//! Typed and untyped object representations.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};
use crate::meta::{ObjectKey, ObjectMeta};

/// A typed object the store knows how to persist.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// `group/version` of the kind.
    const API_VERSION: &'static str;
    const KIND: &'static str;

    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;

    fn key(&self) -> ObjectKey {
        self.meta().key()
    }
}

/// Untyped wire form of an object: type information, metadata, and every
/// other top-level field kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicObject {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl DynamicObject {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        metadata: ObjectMeta,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            metadata,
            data: Map::new(),
        }
    }

    /// Converts a typed object into its untyped form.
    pub fn from_resource<T: Resource>(resource: &T) -> Result<Self> {
        let Value::Object(mut data) = serde_json::to_value(resource)? else {
            return Err(CoreError::invalid_object(format!(
                "{} did not serialize to a JSON object",
                T::KIND
            )));
        };
        data.remove("apiVersion");
        data.remove("kind");
        data.remove("metadata");

        Ok(Self {
            api_version: T::API_VERSION.to_string(),
            kind: T::KIND.to_string(),
            metadata: resource.meta().clone(),
            data,
        })
    }

    /// Decodes this object as `T`, failing if the kind does not match.
    pub fn into_resource<T: Resource>(self) -> Result<T> {
        if self.kind != T::KIND {
            return Err(CoreError::kind_mismatch(T::KIND, self.kind));
        }
        let mut fields = self.data;
        fields.insert("metadata".to_string(), serde_json::to_value(&self.metadata)?);
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }
}
