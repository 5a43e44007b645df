// [apps/script-runner/src/config.rs]
//! Runtime configuration for one script run (§6 "Environment": `SERVER_URL`, `TEAM_ID`,
//! `HOST_NAME`, `DEVICE_ID` may override defaults used by CLI tooling).

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Script Executor: drives a scripted navigation sequence against the orchestrator")]
pub struct ScriptRunnerConfig {
    /// Path to the script definition (JSON, see `crate::script::Script`).
    #[arg(long)]
    pub script: String,

    #[arg(long, env = "SERVER_URL", default_value = "http://localhost:3000")]
    pub server_url: String,

    #[arg(long, env = "TEAM_ID", default_value = "default")]
    pub team_id: String,

    #[arg(long, env = "HOST_NAME")]
    pub host_name: String,

    #[arg(long, env = "DEVICE_ID")]
    pub device_id: String,

    /// `device_model` the command registry validates actions/verifications against (§4.2).
    #[arg(long)]
    pub device_model: String,

    /// Identifies which operator/session this run acts as (§4.7 `takeControl` caller).
    #[arg(long, default_value = "script-runner")]
    pub user_id: String,

    /// Per-RPC deadline handed to the host proxy's retry loop (§5 "Cancellation / timeouts").
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,
}
