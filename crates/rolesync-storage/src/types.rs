//! Storage types for the object store abstraction.

use std::collections::BTreeMap;

use rolesync_core::ObjectMeta;

/// Filters applied by [`ObjectStore::list`](crate::ObjectStore::list).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Restrict to one namespace. `None` lists across all namespaces and
    /// cluster-scoped objects.
    pub namespace: Option<String>,
    /// Equality-based label selector; every entry must match.
    pub label_selector: BTreeMap<String, String>,
}

impl ListParams {
    /// Creates list parameters that match everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to a namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Adds a `key=value` requirement to the label selector.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.label_selector.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if `meta` satisfies these parameters.
    #[must_use]
    pub fn matches(&self, meta: &ObjectMeta) -> bool {
        if let Some(ns) = &self.namespace {
            if meta.namespace.as_ref() != Some(ns) {
                return false;
            }
        }
        self.label_selector
            .iter()
            .all(|(k, v)| meta.labels.get(k) == Some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_match_everything() {
        let mut meta = ObjectMeta::named("a");
        meta.namespace = Some("ns".to_string());
        assert!(ListParams::new().matches(&meta));
    }

    #[test]
    fn test_label_selector() {
        let mut meta = ObjectMeta::named("a");
        meta.labels.insert("tier".to_string(), "edit".to_string());

        assert!(ListParams::new().with_label("tier", "edit").matches(&meta));
        assert!(!ListParams::new().with_label("tier", "view").matches(&meta));
        assert!(!ListParams::new().with_label("missing", "x").matches(&meta));
    }

    #[test]
    fn test_namespace_filter() {
        let cluster = ObjectMeta::named("a");
        let mut namespaced = ObjectMeta::named("b");
        namespaced.namespace = Some("ns".to_string());

        let params = ListParams::new().with_namespace("ns");
        assert!(params.matches(&namespaced));
        assert!(!params.matches(&cluster));
    }
}
