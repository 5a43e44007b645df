// [libs/domain/navigation/src/parent_sync.rs]
//! Parent-node sync (C3, spec §4.3): when a node referenced as a parent by one or more
//! subtrees changes, `{label, data, verifications, node_type, style}` propagate to the
//! duplicate node record in each child subtree. `position` never propagates — duplicates keep
//! their own layout. Single-hop only (§9 Open Questions): a duplicate that is itself a parent
//! of a further subtree is not cascaded to automatically.

use fleetmesh_domain_models::NavigationNode;

/// Applies `updated`'s syncable fields onto `duplicate` in place. At-least-once and idempotent:
/// calling this twice with the same `updated` leaves `duplicate` unchanged after the first call.
pub fn propagate_parent_update(updated: &NavigationNode, duplicate: &mut NavigationNode) {
    duplicate.label = updated.label.clone();
    duplicate.data = updated.data.clone();
    duplicate.verifications = updated.verifications.clone();
    duplicate.node_type = updated.node_type;
    duplicate.style = updated.style.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmesh_domain_models::{NodeType, PassCondition};

    fn node(label: &str, x: f64, y: f64) -> NavigationNode {
        NavigationNode {
            node_id: "n1".into(),
            label: label.into(),
            node_type: NodeType::Screen,
            position: (x, y),
            verifications: vec![],
            screenshot_url: None,
            subtree_ref: None,
            verification_pass_condition: PassCondition::All,
            style: Default::default(),
            data: Default::default(),
        }
    }

    #[test]
    fn propagates_label_and_type_but_not_position() {
        let mut updated = node("Home v2", 100.0, 200.0);
        updated.node_type = NodeType::Menu;
        let mut duplicate = node("Home", 5.0, 5.0);

        propagate_parent_update(&updated, &mut duplicate);

        assert_eq!(duplicate.label, "Home v2");
        assert_eq!(duplicate.node_type, NodeType::Menu);
        assert_eq!(duplicate.position, (5.0, 5.0));
    }

    #[test]
    fn is_idempotent() {
        let updated = node("Home v2", 100.0, 200.0);
        let mut duplicate = node("Home", 5.0, 5.0);

        propagate_parent_update(&updated, &mut duplicate);
        let once = duplicate.clone();
        propagate_parent_update(&updated, &mut duplicate);

        assert_eq!(once.label, duplicate.label);
        assert_eq!(once.position, duplicate.position);
    }
}
