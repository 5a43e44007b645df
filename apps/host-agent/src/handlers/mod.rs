// [apps/host-agent/src/handlers/mod.rs]
//! Host-agent RPC surface (§6), consumed by the server's Host Proxy (C8).

pub mod action;
pub mod av;
pub mod verification;
pub mod zap;
