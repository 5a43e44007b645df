// [apps/server/src/config.rs]
//! Runtime configuration, read from environment variables (§10). `dotenvy::dotenv()` is loaded
//! once in `main` before this is constructed.

use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_HEARTBEAT_SECS: u64 = 10;
const DEFAULT_GRACE_MULTIPLIER: u32 = 3;
const DEFAULT_RETRIES: u32 = 2;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub port: u16,
    pub capture_root: String,
    pub heartbeat_period: Duration,
    pub lease_grace_window: Duration,
    pub host_registry: HashMap<String, String>,
    pub ai_service_base_url: String,
    pub transport_retries: u32,
    /// Device models whose default command catalog (§4.2) is upserted at ignition. Empty by
    /// default: an operator with an existing catalog in the database has nothing to seed.
    pub command_seed_device_models: Vec<String>,
}

impl AppConfig {
    /// Reads every setting from the process environment, falling back to documented defaults
    /// (§10) where a variable is absent.
    pub fn from_env() -> Self {
        let heartbeat_secs: u64 = std::env::var("HEARTBEAT_PERIOD_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HEARTBEAT_SECS);

        let grace_multiplier: u32 = std::env::var("LEASE_GRACE_MULTIPLIER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_GRACE_MULTIPLIER);

        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            database_auth_token: std::env::var("TURSO_AUTH_TOKEN").ok(),
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000),
            capture_root: std::env::var("CAPTURE_ROOT").unwrap_or_else(|_| "/var/fleetmesh/captures".into()),
            heartbeat_period: Duration::from_secs(heartbeat_secs),
            lease_grace_window: Duration::from_secs(heartbeat_secs * grace_multiplier as u64),
            host_registry: parse_host_registry(&std::env::var("HOST_REGISTRY").unwrap_or_default()),
            ai_service_base_url: std::env::var("AI_SERVICE_URL").unwrap_or_else(|_| "http://localhost:9400".into()),
            transport_retries: std::env::var("TRANSPORT_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRIES),
            command_seed_device_models: std::env::var("COMMAND_SEED_DEVICE_MODELS")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// `host_name=base_url` pairs separated by commas, e.g. `livingroom=http://10.0.0.5:9090`.
fn parse_host_registry(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|entry| entry.split_once('='))
        .map(|(host, url)| (host.trim().to_string(), url.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_host_entries() {
        let registry = parse_host_registry("living_room=http://10.0.0.5:9090,kitchen=http://10.0.0.6:9090");
        assert_eq!(registry.get("living_room").unwrap(), "http://10.0.0.5:9090");
        assert_eq!(registry.get("kitchen").unwrap(), "http://10.0.0.6:9090");
    }

    #[test]
    fn empty_registry_parses_to_empty_map() {
        assert!(parse_host_registry("").is_empty());
    }
}
