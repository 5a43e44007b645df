// [libs/infra/db/src/schema.rs]
//! Idempotent schema migration: base tables, then tolerant `ALTER TABLE ADD COLUMN` evolution,
//! then indexes. Safe to run on every process startup against a live database.

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

const BASE_TABLES: &[(&str, &str)] = &[
    ("TABLE_REFERENCES", r#"
        CREATE TABLE IF NOT EXISTS refs (
            team TEXT NOT NULL,
            interface_name TEXT NOT NULL,
            name TEXT NOT NULL,
            reference_type TEXT NOT NULL,
            area_x REAL NOT NULL,
            area_y REAL NOT NULL,
            area_w REAL NOT NULL,
            area_h REAL NOT NULL,
            image_url TEXT NOT NULL,
            text TEXT,
            language TEXT,
            modified INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (team, interface_name, name)
        );
    "#),
    ("TABLE_COMMANDS", r#"
        CREATE TABLE IF NOT EXISTS commands (
            device_model TEXT NOT NULL,
            command_name TEXT NOT NULL,
            kind TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            required_params TEXT NOT NULL DEFAULT '[]',
            requires_input INTEGER NOT NULL DEFAULT 0,
            default_wait_time_ms INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (device_model, command_name)
        );
    "#),
    ("TABLE_NAV_TREES", r#"
        CREATE TABLE IF NOT EXISTS navigation_trees (
            tree_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            userinterface_id TEXT NOT NULL,
            device_model TEXT NOT NULL,
            root_node_id TEXT NOT NULL,
            parent_tree_id TEXT,
            parent_node_id TEXT
        );
    "#),
    ("TABLE_NAV_NODES", r#"
        CREATE TABLE IF NOT EXISTS navigation_nodes (
            tree_id TEXT NOT NULL,
            node_id TEXT NOT NULL,
            label TEXT NOT NULL,
            node_type TEXT NOT NULL,
            position_x REAL NOT NULL DEFAULT 0,
            position_y REAL NOT NULL DEFAULT 0,
            verifications TEXT NOT NULL DEFAULT '[]',
            screenshot_url TEXT,
            subtree_ref TEXT,
            verification_pass_condition TEXT NOT NULL DEFAULT 'all',
            style TEXT NOT NULL DEFAULT '{}',
            data TEXT NOT NULL DEFAULT '{}',
            PRIMARY KEY (tree_id, node_id)
        );
    "#),
    ("TABLE_NAV_EDGES", r#"
        CREATE TABLE IF NOT EXISTS navigation_edges (
            tree_id TEXT NOT NULL,
            edge_id TEXT NOT NULL,
            source_node_id TEXT NOT NULL,
            target_node_id TEXT NOT NULL,
            action_sets TEXT NOT NULL DEFAULT '[]',
            default_action_set_id TEXT NOT NULL,
            final_wait_ms INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (tree_id, edge_id)
        );
    "#),
    ("TABLE_DEVICE_LEASES", r#"
        CREATE TABLE IF NOT EXISTS device_leases (
            host_name TEXT NOT NULL,
            device_id TEXT NOT NULL,
            session_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            tree_id TEXT,
            acquired_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at DATETIME NOT NULL,
            PRIMARY KEY (host_name, device_id)
        );
    "#),
    ("TABLE_CAPTURE_FRAME_RECORDS", r#"
        CREATE TABLE IF NOT EXISTS capture_frame_records (
            host_name TEXT NOT NULL,
            device_id TEXT NOT NULL,
            sequence INTEGER NOT NULL,
            timestamp DATETIME NOT NULL,
            image_url TEXT NOT NULL,
            analysis TEXT NOT NULL DEFAULT '{}',
            PRIMARY KEY (host_name, device_id, sequence)
        );
    "#),
    ("TABLE_ZAP_EVENTS", r#"
        CREATE TABLE IF NOT EXISTS zap_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            host_name TEXT NOT NULL,
            device_id TEXT NOT NULL,
            action_command TEXT NOT NULL,
            key_release_ts REAL NOT NULL,
            detected INTEGER NOT NULL,
            method TEXT,
            duration_s REAL NOT NULL,
            channel_info TEXT,
            recorded_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#),
];

const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[
    ("REF_MODIFIED_DEFAULT", "ALTER TABLE refs ADD COLUMN modified INTEGER NOT NULL DEFAULT 0"),
    ("NODE_DATA_DEFAULT", "ALTER TABLE navigation_nodes ADD COLUMN data TEXT NOT NULL DEFAULT '{}'"),
    ("EDGE_FINAL_WAIT_DEFAULT", "ALTER TABLE navigation_edges ADD COLUMN final_wait_ms INTEGER NOT NULL DEFAULT 0"),
];

const INDEXES: &[(&str, &str)] = &[
    ("IDX_COMMANDS_DEVICE", "CREATE INDEX IF NOT EXISTS idx_commands_device ON commands(device_model);"),
    ("IDX_NAV_EDGES_SOURCE", "CREATE INDEX IF NOT EXISTS idx_nav_edges_source ON navigation_edges(tree_id, source_node_id);"),
    ("IDX_LEASES_EXPIRY", "CREATE INDEX IF NOT EXISTS idx_leases_expiry ON device_leases(expires_at);"),
    ("IDX_NAV_TREES_UI", "CREATE INDEX IF NOT EXISTS idx_nav_trees_ui ON navigation_trees(userinterface_id);"),
    (
        "IDX_CAPTURE_DEVICE_TS",
        "CREATE INDEX IF NOT EXISTS idx_capture_device_ts ON capture_frame_records(host_name, device_id, timestamp);",
    ),
    (
        "IDX_ZAP_EVENTS_DEVICE",
        "CREATE INDEX IF NOT EXISTS idx_zap_events_device ON zap_events(host_name, device_id, recorded_at);",
    ),
];

#[instrument(skip(conn))]
pub async fn apply_schema(conn: &Connection) -> Result<()> {
    info!("applying schema migration");
    create_base_tables(conn).await?;
    apply_evolutionary_strata(conn).await?;
    create_indexes(conn).await?;
    info!("schema migration complete");
    Ok(())
}

async fn create_base_tables(conn: &Connection) -> Result<()> {
    for (label, sql) in BASE_TABLES {
        debug!(table = label, "creating table if not exists");
        conn.execute(sql, ()).await.with_context(|| format!("failed to create table {label}"))?;
    }
    Ok(())
}

async fn apply_evolutionary_strata(conn: &Connection) -> Result<()> {
    for (label, sql) in EVOLUTIONARY_STRATA {
        match conn.execute(sql, ()).await {
            Ok(_) => info!(migration = label, "applied column migration"),
            Err(e) => {
                let message = e.to_string();
                if message.contains("duplicate column name") {
                    debug!(migration = label, "column already present, skipping");
                } else {
                    warn!(migration = label, error = %message, "column migration did not apply cleanly");
                }
            }
        }
    }
    Ok(())
}

async fn create_indexes(conn: &Connection) -> Result<()> {
    for (label, sql) in INDEXES {
        debug!(index = label, "creating index if not exists");
        conn.execute(sql, ()).await.with_context(|| format!("failed to create index {label}"))?;
    }
    Ok(())
}
