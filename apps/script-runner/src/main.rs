// [apps/script-runner/src/main.rs]
//! CLI entry point for the Script Executor (C12). Stdout contract (§6): a `SCRIPT_RESULT_ID:<id>`
//! marker is printed before the run starts, the run summary is printed as JSON once it finishes,
//! and a `SCRIPT_SUCCESS:<true|false>` marker is printed last. Exit code follows success.

use clap::Parser;
use dotenvy::dotenv;
use fleetmesh_script_runner_lib::prelude::*;
use fleetmesh_shared_beacon::init_tracing;
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_tracing("fleetmesh_script_runner");
    let config = ScriptRunnerConfig::parse();

    let script = match read_script(&config.script) {
        Ok(script) => script,
        Err(e) => {
            error!(error = %e, "failed to read script definition");
            println!("SCRIPT_SUCCESS:false");
            return ExitCode::FAILURE;
        }
    };

    let session_id = uuid::Uuid::new_v4().to_string();
    println!("SCRIPT_RESULT_ID:{session_id}");

    match run(&config, &script, &session_id).await {
        Ok(summary) => {
            match serde_json::to_string(&summary) {
                Ok(json) => println!("{json}"),
                Err(e) => error!(error = %e, "failed to serialize run summary"),
            }
            println!("SCRIPT_SUCCESS:{}", summary.script_success);
            if summary.script_success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!(error = %e, "script run failed before completion");
            println!("SCRIPT_SUCCESS:false");
            ExitCode::FAILURE
        }
    }
}

fn read_script(path: &str) -> Result<Script, RunnerError> {
    let raw = std::fs::read_to_string(path).map_err(|e| RunnerError::ScriptIo(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| RunnerError::ScriptIo(e.to_string()))
}
