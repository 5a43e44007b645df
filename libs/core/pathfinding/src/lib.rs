// [libs/core/pathfinding/src/lib.rs]
//! Weighted shortest-path search over a snapshot of the navigation graph, including subtree
//! entry/exit (C5, spec §4.5).
//!
//! The search never touches the cache directly: callers hand it a [`GraphSnapshot`], a
//! point-in-time collection of fully-resolved trees, so a concurrent cache update never
//! perturbs an in-flight search (§4.5 invariant).

use fleetmesh_domain_models::{NavigationEdge, NavigationTree};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PathfindError {
    #[error("no_path: no walk exists from {from} to {to} in tree {tree_id}")]
    NoPath {
        tree_id: String,
        from: String,
        to: String,
    },
    #[error("tree {0} not present in snapshot")]
    UnknownTree(String),
    #[error("node {0} not present in tree")]
    UnknownNode(String),
}

/// One hop of a resolved plan: an edge plus the action_set chosen to traverse it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    pub tree_id: String,
    pub edge_id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub action_set_id: String,
}

/// A point-in-time collection of fully-resolved trees, keyed by `tree_id`.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    trees: HashMap<String, NavigationTree>,
}

impl GraphSnapshot {
    pub fn new(trees: impl IntoIterator<Item = NavigationTree>) -> Self {
        Self {
            trees: trees.into_iter().map(|t| (t.tree_id.clone(), t)).collect(),
        }
    }

    pub fn tree(&self, tree_id: &str) -> Option<&NavigationTree> {
        self.trees.get(tree_id)
    }

    /// Locates the tree that owns `node_id`, searching `root_tree_id` first and then every
    /// tree reachable from it via `subtree_ref`.
    fn locate_owning_tree(&self, root_tree_id: &str, node_id: &str) -> Option<&NavigationTree> {
        let mut frontier = vec![root_tree_id.to_string()];
        let mut seen = std::collections::HashSet::new();

        while let Some(tree_id) = frontier.pop() {
            if !seen.insert(tree_id.clone()) {
                continue;
            }
            let tree = self.trees.get(&tree_id)?;
            if tree.node(node_id).is_some() {
                return Some(tree);
            }
            for node in &tree.nodes {
                if let Some(sub) = &node.subtree_ref {
                    frontier.push(sub.clone());
                }
            }
        }
        None
    }

    /// Returns the `(tree_id, parent_node_id)` of the node in `tree_id` whose `subtree_ref`
    /// points at `child_tree_id`, if any.
    fn parent_link_for(&self, tree_id: &str, child_tree_id: &str) -> Option<(String, String)> {
        let tree = self.trees.get(tree_id)?;
        tree.nodes
            .iter()
            .find(|n| n.subtree_ref.as_deref() == Some(child_tree_id))
            .map(|n| (tree_id.to_string(), n.node_id.clone()))
    }
}

/// Computes the ordered plan from `(tree_id, from_node_id)` to `to_node_id`, descending into
/// subtrees as needed (§4.5). `to_node_id` may live in a nested subtree of `tree_id`; the
/// returned plan enters via the subtree's parent node first.
pub fn find_path(
    snapshot: &GraphSnapshot,
    tree_id: &str,
    from_node_id: &str,
    to_node_id: &str,
) -> Result<Vec<PathStep>, PathfindError> {
    let start_tree = snapshot
        .tree(tree_id)
        .ok_or_else(|| PathfindError::UnknownTree(tree_id.to_string()))?;

    if start_tree.node(to_node_id).is_some() {
        return shortest_path_within_tree(start_tree, from_node_id, to_node_id);
    }

    let owning_tree = snapshot
        .locate_owning_tree(tree_id, to_node_id)
        .ok_or_else(|| PathfindError::UnknownNode(to_node_id.to_string()))?;
    let owning_tree_id = owning_tree.tree_id.clone();

    // Walk the chain of subtree ownership back up to `tree_id`, collecting
    // (tree_id, entry_node_id) pairs to splice together, outermost first.
    let mut chain: Vec<(String, String)> = Vec::new();
    let mut current = owning_tree_id.clone();
    while current != tree_id {
        let (parent_tree, parent_node) = snapshot
            .parent_link_for(&find_parent_of(snapshot, tree_id, &current)?, &current)
            .ok_or_else(|| PathfindError::UnknownTree(current.clone()))?;
        chain.push((current.clone(), owning_tree.root_node_id.clone()));
        current = parent_tree.clone();
        let _ = parent_node;
    }
    chain.reverse();

    // Segment 1: from_node_id -> the parent node in the outer tree that owns the first subtree hop.
    let first_child_tree_id = &chain[0].0;
    let (parent_tree_id, parent_node_id) = snapshot
        .parent_link_for(tree_id, first_child_tree_id)
        .ok_or_else(|| PathfindError::UnknownTree(first_child_tree_id.clone()))?;
    let mut plan = shortest_path_within_tree(start_tree, from_node_id, &parent_node_id)?;
    let _ = parent_tree_id;

    // Segment 2..N: descend through each subtree from its root to either the next parent
    // node (if more nesting remains) or to_node_id (in the owning tree).
    for (idx, (child_tree_id, root_node_id)) in chain.iter().enumerate() {
        let child_tree = snapshot
            .tree(child_tree_id)
            .ok_or_else(|| PathfindError::UnknownTree(child_tree_id.clone()))?;
        let target = if idx + 1 == chain.len() {
            to_node_id.to_string()
        } else {
            snapshot
                .parent_link_for(child_tree_id, &chain[idx + 1].0)
                .ok_or_else(|| PathfindError::UnknownTree(chain[idx + 1].0.clone()))?
                .1
        };
        plan.extend(shortest_path_within_tree(child_tree, root_node_id, &target)?);
    }

    Ok(plan)
}

/// Finds the tree id whose nodes contain a `subtree_ref` equal to `child_tree_id`, searching
/// outward from `search_root`.
fn find_parent_of(
    snapshot: &GraphSnapshot,
    search_root: &str,
    child_tree_id: &str,
) -> Result<String, PathfindError> {
    let mut frontier = vec![search_root.to_string()];
    let mut seen = std::collections::HashSet::new();
    while let Some(tree_id) = frontier.pop() {
        if !seen.insert(tree_id.clone()) {
            continue;
        }
        let Some(tree) = snapshot.tree(&tree_id) else {
            continue;
        };
        for node in &tree.nodes {
            if node.subtree_ref.as_deref() == Some(child_tree_id) {
                return Ok(tree_id);
            }
            if let Some(sub) = &node.subtree_ref {
                frontier.push(sub.clone());
            }
        }
    }
    Err(PathfindError::UnknownTree(child_tree_id.to_string()))
}

#[derive(PartialEq)]
struct Candidate {
    cost: f64,
    node_id: String,
}

impl Eq for Candidate {}
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap via BinaryHeap (which is max-heap by default).
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}
impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Plain Dijkstra within a single tree. Since all edge weights are non-negative, an optimal
/// path never revisits a node, which trivially satisfies "never re-visits an edge in the same
/// search" (§4.5).
fn shortest_path_within_tree(
    tree: &NavigationTree,
    from: &str,
    to: &str,
) -> Result<Vec<PathStep>, PathfindError> {
    if from == to {
        return Ok(vec![]);
    }

    let mut dist: HashMap<&str, f64> = HashMap::new();
    let mut prev: HashMap<&str, (&NavigationEdge, String)> = HashMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(from, 0.0);
    heap.push(Candidate {
        cost: 0.0,
        node_id: from.to_string(),
    });

    while let Some(Candidate { cost, node_id }) = heap.pop() {
        if node_id == to {
            break;
        }
        if cost > *dist.get(node_id.as_str()).unwrap_or(&f64::INFINITY) {
            continue;
        }
        for edge in tree.edges_from(&node_id) {
            let Some(action_set_id) = chosen_action_set(edge) else {
                continue;
            };
            let Some(weight) = edge.weight_via(&action_set_id) else {
                continue;
            };
            let next_cost = cost + weight;
            let better = next_cost
                < *dist
                    .get(edge.target_node_id.as_str())
                    .unwrap_or(&f64::INFINITY);
            if better {
                dist.insert(&edge.target_node_id, next_cost);
                prev.insert(&edge.target_node_id, (edge, action_set_id));
                heap.push(Candidate {
                    cost: next_cost,
                    node_id: edge.target_node_id.clone(),
                });
            }
        }
    }

    if !dist.contains_key(to) {
        return Err(PathfindError::NoPath {
            tree_id: tree.tree_id.clone(),
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    // Walk `prev` back from `to` to `from`.
    let mut steps = Vec::new();
    let mut cursor = to.to_string();
    while cursor != from {
        let (edge, action_set_id) = prev
            .get(cursor.as_str())
            .ok_or_else(|| PathfindError::NoPath {
                tree_id: tree.tree_id.clone(),
                from: from.to_string(),
                to: to.to_string(),
            })?;
        steps.push(PathStep {
            tree_id: tree.tree_id.clone(),
            edge_id: edge.edge_id.clone(),
            source_node_id: edge.source_node_id.clone(),
            target_node_id: edge.target_node_id.clone(),
            action_set_id: action_set_id.clone(),
        });
        cursor = edge.source_node_id.clone();
    }
    steps.reverse();
    Ok(steps)
}

/// Ties between candidate paths are broken by the edge's own `default_action_set_id`
/// (§4.5) — the search always dispatches the default action_set for a chosen edge.
fn chosen_action_set(edge: &NavigationEdge) -> Option<String> {
    edge.default_action_set().map(|_| edge.default_action_set_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmesh_domain_models::{Action, ActionSet, NavigationEdge, NavigationNode, NodeType, PassCondition};
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

    fn edge(
        tree_id: &str,
        edge_id: &str,
        source: &str,
        target: &str,
        n_actions: usize,
        final_wait_ms: u64,
    ) -> NavigationEdge {
        let actions = (0..n_actions)
            .map(|i| Action {
                command: format!("click_{i}"),
                params: json!({"wait_time_ms": 1000}).as_object().unwrap().clone(),
            })
            .collect();
        NavigationEdge {
            tree_id: tree_id.to_string(),
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
            final_wait_ms,
        }
    }

    #[test]
    fn finds_direct_path() {
        let tree = NavigationTree {
            tree_id: "t1".into(),
            name: "main".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "home".into(),
            nodes: vec![node("home"), node("settings")],
            edges: vec![edge("t1", "e1", "home", "settings", 1, 0)],
            parent_link: None,
        };
        let snapshot = GraphSnapshot::new(vec![tree]);
        let plan = find_path(&snapshot, "t1", "home", "settings").unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].edge_id, "e1");
    }

    #[test]
    fn no_path_when_no_walk_exists() {
        let tree = NavigationTree {
            tree_id: "t1".into(),
            name: "main".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "home".into(),
            nodes: vec![node("home"), node("isolated")],
            edges: vec![],
            parent_link: None,
        };
        let snapshot = GraphSnapshot::new(vec![tree]);
        let err = find_path(&snapshot, "t1", "home", "isolated").unwrap_err();
        assert!(matches!(err, PathfindError::NoPath { .. }));
    }

    #[test]
    fn prefers_cheaper_path_by_weight() {
        let mut cheap = edge("t1", "cheap", "home", "target", 1, 0);
        cheap.action_sets[0].action_set_id = "cheap_set".into();
        cheap.default_action_set_id = "cheap_set".into();
        let mut expensive = edge("t1", "expensive", "home", "via", 3, 5000);
        expensive.action_sets[0].action_set_id = "expensive_set".into();
        expensive.default_action_set_id = "expensive_set".into();
        let finisher = edge("t1", "finish", "via", "target", 1, 0);

        let tree = NavigationTree {
            tree_id: "t1".into(),
            name: "main".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "home".into(),
            nodes: vec![node("home"), node("via"), node("target")],
            edges: vec![cheap, expensive, finisher],
            parent_link: None,
        };
        let snapshot = GraphSnapshot::new(vec![tree]);
        let plan = find_path(&snapshot, "t1", "home", "target").unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].edge_id, "cheap");
    }

    /// Mirrors scenario S3 (spec §8): home -> settings in the outer tree, then settings' ->
    /// privacy inside the subtree rooted at `settings'`, entering via the parent node.
    #[test]
    fn traverses_into_subtree_via_parent_node() {
        let mut home_to_settings = edge("outer", "e1", "home", "settings", 1, 0);
        home_to_settings.action_sets[0].action_set_id = "open".into();
        home_to_settings.default_action_set_id = "open".into();

        let mut settings_node = node("settings");
        settings_node.subtree_ref = Some("inner".into());

        let outer = NavigationTree {
            tree_id: "outer".into(),
            name: "main".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "home".into(),
            nodes: vec![node("home"), settings_node],
            edges: vec![home_to_settings],
            parent_link: None,
        };

        let inner = NavigationTree {
            tree_id: "inner".into(),
            name: "settings subtree".into(),
            userinterface_id: "ui1".into(),
            device_model: "host_vnc".into(),
            root_node_id: "settings_prime".into(),
            nodes: vec![node("settings_prime"), node("privacy")],
            edges: vec![edge("inner", "e2", "settings_prime", "privacy", 1, 0)],
            parent_link: Some(("outer".into(), "settings".into())),
        };

        let snapshot = GraphSnapshot::new(vec![outer, inner]);
        let plan = find_path(&snapshot, "outer", "home", "privacy").unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].edge_id, "e1");
        assert_eq!(plan[1].edge_id, "e2");
    }
}
