// [apps/host-agent/src/lib.rs]
//! Per-host process library root: capture ingestion and analysis pipeline (C9/C10), zap
//! detection (C11) and the device-control RPC surface (C8's counterpart) behind one axum router.

pub mod capture;
pub mod config;
pub mod driver;
pub mod errors;
pub mod handlers;
pub mod lease_cache;
pub mod routes;
pub mod state;
pub mod zap;

pub mod prelude {
    pub use crate::config::HostAgentConfig;
    pub use crate::state::HostAgentState;
}
