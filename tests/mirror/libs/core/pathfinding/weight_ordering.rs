//! External integration test wired via `[[test]] name = "pathfinding_weight_ordering"`,
//! mirroring `libs/core/pathfinding` (§4.5 weight ordering invariant).

use fleetmesh_core_pathfinding::{find_path, GraphSnapshot};
use fleetmesh_domain_models::{Action, ActionSet, NavigationEdge, NavigationNode, NavigationTree, NodeType, PassCondition};
use proptest::prelude::*;
use serde_json::json;

fn node(id: &str) -> NavigationNode {
    NavigationNode {
        node_id: id.to_string(),
        label: id.to_string(),
        node_type: NodeType::Screen,
        position: (0.0, 0.0),
        verifications: vec![],
        screenshot_url: None,
        subtree_ref: None,
        verification_pass_condition: PassCondition::All,
        style: Default::default(),
        data: Default::default(),
    }
}

fn edge_with_actions(edge_id: &str, source: &str, target: &str, n_actions: usize) -> NavigationEdge {
    let actions = (0..n_actions)
        .map(|i| Action { command: format!("click_{i}"), params: json!({}).as_object().unwrap().clone() })
        .collect();
    NavigationEdge {
        tree_id: "t1".into(),
        edge_id: edge_id.to_string(),
        source_node_id: source.to_string(),
        target_node_id: target.to_string(),
        action_sets: vec![ActionSet {
            action_set_id: "default".into(),
            label: "default".into(),
            actions,
            retry_actions: vec![],
            failure_actions: vec![],
        }],
        default_action_set_id: "default".into(),
        final_wait_ms: 0,
    }
}

proptest! {
    /// Two direct edges `home -> target`, one with strictly fewer actions than the other: the
    /// pathfinder must always route through the edge with fewer actions, since `ActionSet::weight`
    /// grows monotonically with `actions.len()` and the search picks the least-cost edge (§4.5).
    #[test]
    fn prefers_the_edge_with_fewer_actions(cheap_actions in 0usize..5, extra_actions in 1usize..5) {
        let expensive_actions = cheap_actions + extra_actions;

        let mut cheap = edge_with_actions("cheap", "home", "target", cheap_actions);
        cheap.action_sets[0].action_set_id = "cheap_set".into();
        cheap.default_action_set_id = "cheap_set".into();

        let mut expensive = edge_with_actions("expensive", "home", "target", expensive_actions);
        expensive.action_sets[0].action_set_id = "expensive_set".into();
        expensive.default_action_set_id = "expensive_set".into();

        let tree = NavigationTree {
            tree_id: "t1".into(),
            name: "main".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "home".into(),
            nodes: vec![node("home"), node("target")],
            edges: vec![cheap, expensive],
            parent_link: None,
        };
        let snapshot = GraphSnapshot::new(vec![tree]);
        let plan = find_path(&snapshot, "t1", "home", "target").unwrap();

        prop_assert_eq!(plan.len(), 1);
        prop_assert_eq!(&plan[0].edge_id, "cheap");
    }
}
