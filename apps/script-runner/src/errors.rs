// [apps/script-runner/src/errors.rs]
//! Run-level error catalog (§7: Transport/Semantic categories relevant to a caller outside the
//! orchestrator process). `thiserror` here, matching the teacher's library-boundary convention;
//! `main` wraps these in `anyhow::Result` at the process boundary.

use fleetmesh_core_pathfinding::PathfindError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("transport error talking to the orchestrator: {0}")]
    Transport(String),

    #[error("orchestrator rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("no path to {to} from {from} in tree {tree_id}")]
    NoPath { tree_id: String, from: String, to: String },

    #[error("edge {edge_id} has no action_set {action_set_id}")]
    MissingActionSet { edge_id: String, action_set_id: String },

    #[error("node {0} not present in the fetched tree")]
    UnknownNode(String),

    #[error("script definition could not be read: {0}")]
    ScriptIo(String),
}

impl From<PathfindError> for RunnerError {
    fn from(err: PathfindError) -> Self {
        match err {
            PathfindError::NoPath { tree_id, from, to } => Self::NoPath { tree_id, from, to },
            other => Self::Transport(other.to_string()),
        }
    }
}
