// [apps/host-agent/src/config.rs]
//! Runtime configuration for a single host-agent process (§10, §6 "Environment"). One process
//! per physical host; `device_drivers` says which control backend (C2 `CommandKind`) owns each
//! device attached to this host.

use clap::Parser;
use fleetmesh_domain_models::CommandKind;
use std::collections::HashMap;

/// §4.10 "Blackscreen": mean luminance is measured over a configurable rectangle, not the whole
/// frame; the default rectangle is the top 2/3 of the frame.
const DEFAULT_BLACKSCREEN_REGION_TOP_FRACTION: f64 = 2.0 / 3.0;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Host-agent: capture ingestion, frame analysis and device control for one physical host")]
pub struct HostAgentConfig {
    /// Name this host is registered under in the server's `HOST_REGISTRY` (§10).
    #[arg(long, env = "HOST_NAME")]
    pub host_name: String,

    /// Base URL of the orchestrator, e.g. `http://10.0.0.2:3000` (§6 "Environment").
    #[arg(long, env = "SERVER_URL")]
    pub server_url: String,

    /// `device_id=driver_kind` pairs, comma separated, e.g. `dev1=adb,dev2=web`.
    #[arg(long, env = "DEVICE_DRIVERS", default_value = "")]
    pub device_drivers_raw: String,

    /// `device_id=source_uri` pairs feeding the capture producer, e.g.
    /// `dev1=rtsp://10.0.0.5/stream`.
    #[arg(long, env = "DEVICE_SOURCES", default_value = "")]
    pub device_sources_raw: String,

    #[arg(long, env = "PORT", default_value_t = 9090)]
    pub port: u16,

    #[arg(long, env = "CAPTURE_ROOT", default_value = "/var/fleetmesh/captures")]
    pub capture_root: String,

    #[arg(long, env = "AI_SERVICE_URL", default_value = "http://localhost:9400")]
    pub ai_service_url: String,

    /// Source frame rate assumed by the capture producer (§4.10: "≈5 fps").
    #[arg(long, env = "CAPTURE_FPS", default_value_t = 5)]
    pub capture_fps: u32,

    /// How often the lease cache (§6 defense-in-depth check) refreshes from the server.
    #[arg(long, env = "LEASE_CACHE_TTL_SECS", default_value_t = 2)]
    pub lease_cache_ttl_secs: u64,

    /// Fraction of the frame's height, measured from the top, that blackscreen luminance is
    /// computed over (§4.10). `1.0` covers the whole frame.
    #[arg(long, env = "BLACKSCREEN_REGION_TOP_FRACTION", default_value_t = DEFAULT_BLACKSCREEN_REGION_TOP_FRACTION)]
    pub blackscreen_region_top_fraction: f64,
}

impl HostAgentConfig {
    pub fn device_drivers(&self) -> HashMap<String, CommandKind> {
        self.device_drivers_raw
            .split(',')
            .filter_map(|entry| entry.split_once('='))
            .filter_map(|(device_id, kind)| parse_kind(kind).map(|k| (device_id.trim().to_string(), k)))
            .collect()
    }

    pub fn device_sources(&self) -> HashMap<String, String> {
        self.device_sources_raw
            .split(',')
            .filter_map(|entry| entry.split_once('='))
            .map(|(device_id, uri)| (device_id.trim().to_string(), uri.trim().to_string()))
            .collect()
    }
}

fn parse_kind(raw: &str) -> Option<CommandKind> {
    match raw.trim() {
        "remote" => Some(CommandKind::Remote),
        "adb" => Some(CommandKind::Adb),
        "web" => Some(CommandKind::Web),
        "ir" => Some(CommandKind::Ir),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_driver_kinds() {
        let config = HostAgentConfig {
            host_name: "living_room".into(),
            server_url: "http://localhost:3000".into(),
            device_drivers_raw: "dev1=adb,dev2=web,dev3=ir".into(),
            device_sources_raw: String::new(),
            port: 9090,
            capture_root: "/tmp".into(),
            ai_service_url: "http://localhost:9400".into(),
            capture_fps: 5,
            lease_cache_ttl_secs: 2,
            blackscreen_region_top_fraction: DEFAULT_BLACKSCREEN_REGION_TOP_FRACTION,
        };
        let drivers = config.device_drivers();
        assert_eq!(drivers.get("dev1"), Some(&CommandKind::Adb));
        assert_eq!(drivers.get("dev2"), Some(&CommandKind::Web));
        assert_eq!(drivers.get("dev3"), Some(&CommandKind::Ir));
    }

    #[test]
    fn unknown_kind_is_skipped_not_erroring() {
        let config = HostAgentConfig {
            host_name: "h".into(),
            server_url: "http://localhost:3000".into(),
            device_drivers_raw: "dev1=bogus".into(),
            device_sources_raw: String::new(),
            port: 9090,
            capture_root: "/tmp".into(),
            ai_service_url: "http://localhost:9400".into(),
            capture_fps: 5,
            lease_cache_ttl_secs: 2,
            blackscreen_region_top_fraction: DEFAULT_BLACKSCREEN_REGION_TOP_FRACTION,
        };
        assert!(config.device_drivers().is_empty());
    }
}
