// [apps/script-runner/src/script.rs]
//! On-disk script definition: a userinterface to navigate and an ordered list of destination
//! nodes. Each step is resolved into a path at run time (C5), not pre-baked, so a script survives
//! graph edits between runs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Script {
    pub userinterface_id: String,
    /// Node to start from; defaults to the fetched tree's `root_node_id` when absent.
    #[serde(default)]
    pub start_node_id: Option<String>,
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScriptStep {
    pub to_node_id: String,
    /// Invoke C11 once this step's navigation actions have been dispatched (§4.12 step 2).
    #[serde(default)]
    pub measure_zap: bool,
    /// A failed action batch or verification on this step does not fail the run (§4.12:
    /// "Step failures within tolerable policy continue execution").
    #[serde(default)]
    pub tolerate_failure: bool,
}
