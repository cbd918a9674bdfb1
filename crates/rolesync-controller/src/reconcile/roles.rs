//! Cluster roles derived from a revision's resource definitions.

use std::collections::HashMap;

use rolesync_core::{
    ClusterRole, CustomResourceDefinition, ObjectMeta, PolicyRule, ProviderRevision,
};

const NAME_PREFIX: &str = "rolesync:provider:";
const NAME_SUFFIX_SYSTEM: &str = ":system";
const NAME_SUFFIX_EDIT: &str = ":aggregate-to-edit";
const NAME_SUFFIX_VIEW: &str = ":aggregate-to-view";

const KEY_AGGREGATE_TO_ROLESYNC: &str = "rbac.rolesync.io/aggregate-to-rolesync";
const KEY_AGGREGATE_TO_ADMIN: &str = "rbac.rolesync.io/aggregate-to-admin";
const KEY_AGGREGATE_TO_EDIT: &str = "rbac.rolesync.io/aggregate-to-edit";
const KEY_AGGREGATE_TO_VIEW: &str = "rbac.rolesync.io/aggregate-to-view";

const VAL_TRUE: &str = "true";
const SUFFIX_STATUS: &str = "/status";

const VERBS_EDIT: &[&str] = &["*"];
const VERBS_VIEW: &[&str] = &["get", "list", "watch"];
const VERBS_SYSTEM: &[&str] = &["get", "list", "watch", "update", "patch", "create"];

/// Computes the cluster roles a revision should have. Must be pure.
pub trait ClusterRoleRenderer: Send + Sync {
    fn render(
        &self,
        revision: &ProviderRevision,
        crds: &[CustomResourceDefinition],
    ) -> Vec<ClusterRole>;
}

impl<F> ClusterRoleRenderer for F
where
    F: Fn(&ProviderRevision, &[CustomResourceDefinition]) -> Vec<ClusterRole> + Send + Sync,
{
    fn render(
        &self,
        revision: &ProviderRevision,
        crds: &[CustomResourceDefinition],
    ) -> Vec<ClusterRole> {
        self(revision, crds)
    }
}

/// Name of the role granted to the provider's own workload.
pub fn system_cluster_role_name(revision_name: &str) -> String {
    format!("{NAME_PREFIX}{revision_name}{NAME_SUFFIX_SYSTEM}")
}

/// Renders a system role for the provider itself plus edit and view roles
/// that aggregate into the cluster's user-facing roles.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

fn extra_system_rules() -> Vec<PolicyRule> {
    vec![PolicyRule::new(
        ["", "coordination.k8s.io"],
        ["secrets", "configmaps", "events", "leases"],
        VERBS_EDIT.iter().copied(),
    )]
}

fn with_verbs(rules: &[PolicyRule], verbs: &[&str]) -> Vec<PolicyRule> {
    rules
        .iter()
        .map(|rule| PolicyRule {
            verbs: verbs.iter().map(|v| v.to_string()).collect(),
            ..rule.clone()
        })
        .collect()
}

fn labeled(name: String, labels: &[&str]) -> ObjectMeta {
    let mut meta = ObjectMeta::named(name);
    meta.labels = labels
        .iter()
        .map(|key| (key.to_string(), VAL_TRUE.to_string()))
        .collect();
    meta
}

/// One verb-less rule per API group, covering each owned resource and its
/// status subresource.
fn resource_rules(crds: &[CustomResourceDefinition]) -> Vec<PolicyRule> {
    // Sorted so that rules do not reorder between calls.
    let mut sorted: Vec<&CustomResourceDefinition> = crds.iter().collect();
    sorted.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));

    let mut groups: Vec<&str> = Vec::new();
    let mut resources: HashMap<&str, Vec<String>> = HashMap::new();
    for crd in sorted {
        let group = crd.spec.group.as_str();
        let entry = resources.entry(group).or_insert_with(|| {
            groups.push(group);
            Vec::new()
        });
        entry.push(crd.spec.names.plural.clone());
        entry.push(format!("{}{SUFFIX_STATUS}", crd.spec.names.plural));
    }

    groups
        .into_iter()
        .map(|group| PolicyRule {
            api_groups: vec![group.to_string()],
            resources: resources.remove(group).unwrap_or_default(),
            ..Default::default()
        })
        .collect()
}

impl ClusterRoleRenderer for DefaultRenderer {
    fn render(
        &self,
        revision: &ProviderRevision,
        crds: &[CustomResourceDefinition],
    ) -> Vec<ClusterRole> {
        let name = &revision.metadata.name;
        let rules = resource_rules(crds);

        let mut system_rules = with_verbs(&rules, VERBS_SYSTEM);
        system_rules.extend(extra_system_rules());
        system_rules.extend(revision.status.permission_requests.iter().cloned());

        let system = ClusterRole {
            metadata: ObjectMeta::named(system_cluster_role_name(name)),
            rules: system_rules,
        };

        let edit = ClusterRole {
            metadata: labeled(
                format!("{NAME_PREFIX}{name}{NAME_SUFFIX_EDIT}"),
                &[
                    KEY_AGGREGATE_TO_ROLESYNC,
                    KEY_AGGREGATE_TO_ADMIN,
                    KEY_AGGREGATE_TO_EDIT,
                ],
            ),
            rules: with_verbs(&rules, VERBS_EDIT),
        };

        let view = ClusterRole {
            metadata: labeled(
                format!("{NAME_PREFIX}{name}{NAME_SUFFIX_VIEW}"),
                &[KEY_AGGREGATE_TO_VIEW],
            ),
            rules: with_verbs(&rules, VERBS_VIEW),
        };

        vec![system, edit, view]
    }
}
