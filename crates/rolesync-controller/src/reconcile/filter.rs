use rolesync_core::{CustomResourceDefinition, Uid, is_controlled_by};

/// Keeps the definitions whose controller reference points at `uid`,
/// preserving their order.
pub fn controlled_by(
    crds: impl IntoIterator<Item = CustomResourceDefinition>,
    uid: &Uid,
) -> Vec<CustomResourceDefinition> {
    crds.into_iter()
        .filter(|crd| is_controlled_by(&crd.metadata.owner_references, uid))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolesync_core::{OwnerReference, as_controller};

    fn crd(plural: &str, owner: Option<OwnerReference>) -> CustomResourceDefinition {
        let mut crd = CustomResourceDefinition::new("example.org", "Widget", plural);
        crd.metadata.owner_references = owner.into_iter().collect();
        crd
    }

    fn reference(uid: &str) -> OwnerReference {
        OwnerReference {
            uid: Uid::from(uid),
            ..Default::default()
        }
    }

    #[test]
    fn test_keeps_only_controlled_definitions() {
        let uid = Uid::from("rev");
        let crds = vec![
            crd("widgets", Some(as_controller(reference("rev")))),
            crd("gadgets", None),
        ];

        let owned = controlled_by(crds, &uid);
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].spec.names.plural, "widgets");
    }

    #[test]
    fn test_drops_plain_and_foreign_owners() {
        let uid = Uid::from("rev");
        let crds = vec![
            crd("widgets", Some(reference("rev"))),
            crd("gadgets", Some(as_controller(reference("other")))),
        ];
        assert!(controlled_by(crds, &uid).is_empty());
    }

    #[test]
    fn test_preserves_input_order() {
        let uid = Uid::from("rev");
        let crds = vec![
            crd("zeds", Some(as_controller(reference("rev")))),
            crd("alphas", Some(as_controller(reference("rev")))),
        ];

        let plurals: Vec<_> = controlled_by(crds, &uid)
            .into_iter()
            .map(|c| c.spec.names.plural)
            .collect();
        assert_eq!(plurals, vec!["zeds", "alphas"]);
    }
}
