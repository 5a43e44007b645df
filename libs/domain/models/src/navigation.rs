//! [libs/domain/models/src/navigation.rs]
//! Navigation graph entities: trees, nodes, edges, action sets and verifications (§3, §4.3).

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// A rendering-only rectangle; never consulted for pathfinding or verification semantics.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Area {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Entry,
    Screen,
    Menu,
    Action,
    SubtreeRoot,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PassCondition {
    All,
    Any,
}

impl Default for PassCondition {
    fn default() -> Self {
        PassCondition::All
    }
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationType {
    Image,
    Text,
    Web,
    Adb,
    Video,
    Audio,
}

/// `{ command, verification_type, params{}, pass_condition? }` (§3).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub command: String,
    pub verification_type: VerificationType,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub pass_condition: Option<PassCondition>,
}

/// `{ command, params{}, wait_time_ms }`. `wait_time_ms` lives inside `params`, never as a
/// sibling field, so the wire shape matches §6's action payloads verbatim.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub command: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl Action {
    /// `wait_time_ms` is read out of `params.wait_time_ms`, defaulting to 0 when absent.
    pub fn wait_time_ms(&self) -> u64 {
        self.params
            .get("wait_time_ms")
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSet {
    pub action_set_id: String,
    pub label: String,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub retry_actions: Vec<Action>,
    #[serde(default)]
    pub failure_actions: Vec<Action>,
}

impl ActionSet {
    /// Edge weight contribution of this action_set in isolation (§4.5): the sum of its own
    /// actions plus half-weighted retry actions. `final_wait_ms` is added by the caller since
    /// it belongs to the edge, not the action_set.
    pub fn weight(&self) -> f64 {
        self.actions.len() as f64 + self.retry_actions.len() as f64 * 0.5
    }
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationNode {
    pub node_id: String,
    pub label: String,
    pub node_type: NodeType,
    pub position: (f64, f64),
    #[serde(default)]
    pub verifications: Vec<Verification>,
    #[serde(default)]
    pub screenshot_url: Option<String>,
    #[serde(default)]
    pub subtree_ref: Option<String>,
    #[serde(default)]
    pub verification_pass_condition: PassCondition,
    /// Style payload opaque to the core; propagated verbatim by parent-node sync (§4.3).
    #[serde(default)]
    pub style: serde_json::Map<String, serde_json::Value>,
    /// Free-form editor payload, propagated by parent-node sync alongside `label`/`verifications`.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationEdge {
    pub tree_id: String,
    pub edge_id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub action_sets: Vec<ActionSet>,
    pub default_action_set_id: String,
    #[serde(default)]
    pub final_wait_ms: u64,
}

impl NavigationEdge {
    pub fn action_set(&self, action_set_id: &str) -> Option<&ActionSet> {
        self.action_sets.iter().find(|a| a.action_set_id == action_set_id)
    }

    pub fn default_action_set(&self) -> Option<&ActionSet> {
        self.action_set(&self.default_action_set_id)
    }

    /// Full edge weight per §4.5: `len(actions) + len(retry_actions)*0.5 + final_wait_ms/1000`,
    /// evaluated against a specific action_set (an edge may offer more than one).
    pub fn weight_via(&self, action_set_id: &str) -> Option<f64> {
        self.action_set(action_set_id)
            .map(|set| set.weight() + self.final_wait_ms as f64 / 1000.0)
    }
}

/// A fully-resolved tree as served by the Navigation Cache (C4) — references and command specs
/// inlined, no joins required of downstream consumers.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationTree {
    pub tree_id: String,
    pub name: String,
    pub userinterface_id: String,
    pub device_model: String,
    pub root_node_id: String,
    pub nodes: Vec<NavigationNode>,
    pub edges: Vec<NavigationEdge>,
    /// `(tree_id, parent_node_id)` — subtree membership as a lookup tuple, never an embedded
    /// pointer, so cyclic subtree graphs stay representable (§9 redesign flag).
    #[serde(default)]
    pub parent_link: Option<(String, String)>,
}

impl NavigationTree {
    pub fn node(&self, node_id: &str) -> Option<&NavigationNode> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    pub fn edges_from(&self, node_id: &str) -> impl Iterator<Item = &NavigationEdge> {
        self.edges.iter().filter(move |e| e.source_node_id == node_id)
    }
}
