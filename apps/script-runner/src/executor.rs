// [apps/script-runner/src/executor.rs]
//! Script Executor (C12, §4.12): `setup` → per-step `resolve → dispatch → wait → verify →
//! optional zap` → `teardown`, always releasing the lease on the way out.

use crate::client::ServerClient;
use crate::config::ScriptRunnerConfig;
use crate::errors::RunnerError;
use crate::script::{Script, ScriptStep};
use chrono::Utc;
use fleetmesh_core_pathfinding::{find_path, GraphSnapshot};
use fleetmesh_domain_models::{Verification, ZapEvent};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step_index: usize,
    pub from: String,
    pub to: String,
    pub navigation_success: bool,
    pub verification_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zap: Option<ZapEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    fn success(&self) -> bool {
        self.navigation_success && self.verification_success
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub script_success: bool,
    /// No dedicated report-storage endpoint exists in the external surface (§6); a report is
    /// only ever this process's own stdout, so there is nothing to point a URL at.
    pub report_url: Option<String>,
    pub step_results: Vec<StepReport>,
}

/// Runs the whole script. The lease is released on every exit path, including early failure.
pub async fn run(config: &ScriptRunnerConfig, script: &Script, session_id: &str) -> Result<RunSummary, RunnerError> {
    let client = ServerClient::new(&config.server_url, std::time::Duration::from_secs(config.request_timeout_secs))?;

    client.take_control(&config.host_name, &config.device_id, session_id, &config.user_id).await?;
    info!(session_id, "lease acquired, starting script");

    if let Err(e) = client.zap_reset(&config.host_name, &config.device_id, session_id).await {
        warn!(error = %e, "zap-detector reset failed, continuing without a clean learned state");
    }

    let outcome = run_steps(config, script, session_id, &client).await;

    if let Err(e) = client.release_control(&config.host_name, &config.device_id, session_id).await {
        warn!(error = %e, "failed to release lease during teardown");
    }

    outcome
}

async fn run_steps(
    config: &ScriptRunnerConfig,
    script: &Script,
    session_id: &str,
    client: &ServerClient,
) -> Result<RunSummary, RunnerError> {
    let tree = client.get_tree_by_userinterface_id(&script.userinterface_id).await?;
    let snapshot = GraphSnapshot::new(vec![tree.clone()]);

    let mut current = script.start_node_id.clone().unwrap_or_else(|| tree.root_node_id.clone());
    let mut step_results = Vec::with_capacity(script.steps.len());
    let mut script_success = true;

    for (step_index, step) in script.steps.iter().enumerate() {
        let from = current.clone();
        let mut report = run_one_step(config, session_id, client, &snapshot, &tree, &from, step).await;
        report.step_index = step_index;

        let step_failed = !report.success();
        if step_failed {
            warn!(step_index, from = %report.from, to = %report.to, "step failed");
        }
        if report.navigation_success {
            current = step.to_node_id.clone();
        }

        step_results.push(report);

        if step_failed && !step.tolerate_failure {
            script_success = false;
            break;
        }
        if step_failed {
            script_success = false;
        }
    }

    Ok(RunSummary { script_success, report_url: None, step_results })
}

async fn run_one_step(
    config: &ScriptRunnerConfig,
    session_id: &str,
    client: &ServerClient,
    snapshot: &GraphSnapshot,
    tree: &fleetmesh_domain_models::NavigationTree,
    from: &str,
    step: &ScriptStep,
) -> StepReport {
    match run_one_step_fallible(config, session_id, client, snapshot, tree, from, step).await {
        Ok(report) => report,
        Err(e) => StepReport {
            step_index: 0,
            from: from.to_string(),
            to: step.to_node_id.clone(),
            navigation_success: false,
            verification_success: false,
            zap: None,
            error: Some(e.to_string()),
        },
    }
}

async fn run_one_step_fallible(
    config: &ScriptRunnerConfig,
    session_id: &str,
    client: &ServerClient,
    snapshot: &GraphSnapshot,
    tree: &fleetmesh_domain_models::NavigationTree,
    from: &str,
    step: &ScriptStep,
) -> Result<StepReport, RunnerError> {
    let path = find_path(snapshot, &tree.tree_id, from, &step.to_node_id)?;

    let mut navigation_success = true;
    let mut last_action_command: Option<String> = None;
    let mut key_release_ts = Utc::now().timestamp_millis() as f64 / 1000.0;

    for hop in &path {
        let edge = tree
            .edges
            .iter()
            .find(|e| e.edge_id == hop.edge_id)
            .ok_or_else(|| RunnerError::UnknownNode(hop.edge_id.clone()))?;
        let action_set = edge
            .action_set(&hop.action_set_id)
            .ok_or_else(|| RunnerError::MissingActionSet { edge_id: edge.edge_id.clone(), action_set_id: hop.action_set_id.clone() })?;

        let response = client
            .execute_batch(
                &config.host_name,
                &config.device_id,
                session_id,
                &config.device_model,
                &action_set.actions,
                &action_set.retry_actions,
            )
            .await?;
        navigation_success &= response.success;
        last_action_command = action_set.actions.last().map(|a| a.command.clone());

        if edge.final_wait_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(edge.final_wait_ms)).await;
        }
        key_release_ts = Utc::now().timestamp_millis() as f64 / 1000.0;
    }

    let zap = if step.measure_zap {
        let command = last_action_command.unwrap_or_default();
        match client.zap_observe(&config.host_name, &config.device_id, session_id, &command, key_release_ts).await {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "zap observation call failed");
                None
            }
        }
    } else {
        None
    };

    let target_node = tree.node(&step.to_node_id).ok_or_else(|| RunnerError::UnknownNode(step.to_node_id.clone()))?;
    let verification_success = if target_node.verifications.is_empty() {
        true
    } else {
        let verifications: Vec<Verification> = target_node
            .verifications
            .iter()
            .cloned()
            .map(|mut v| {
                if v.pass_condition.is_none() {
                    v.pass_condition = Some(target_node.verification_pass_condition);
                }
                v
            })
            .collect();

        let response = client
            .execute_verification(&config.host_name, &config.device_id, session_id, &config.device_model, &verifications)
            .await?;
        response.success
    };

    Ok(StepReport {
        step_index: 0,
        from: from.to_string(),
        to: step.to_node_id.clone(),
        navigation_success,
        verification_success,
        zap,
        error: None,
    })
}

