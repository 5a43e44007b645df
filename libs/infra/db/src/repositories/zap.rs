// [libs/infra/db/src/repositories/zap.rs]
//! Zap event persistence (C11, §3 "ambient persistence shape"). Write-mostly audit trail of
//! completed zap-detection events; not consulted by the detector itself, which is pure and
//! in-memory for the lifetime of a run.

use crate::errors::DbError;
use crate::DbClient;
use fleetmesh_domain_models::{ChannelInfo, ZapEvent, ZapMethod};
use libsql::params;
use tracing::instrument;

pub struct ZapEventRepository {
    client: DbClient,
}

impl ZapEventRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, event), fields(host_name, device_id = %event.device_id, detected = event.detected))]
    pub async fn record(&self, host_name: &str, event: &ZapEvent) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        let method = event.method.map(|m| match m {
            ZapMethod::Blackscreen => "blackscreen",
            ZapMethod::Freeze => "freeze",
        });
        let channel_info = event
            .channel_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DbError::MappingError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO zap_events (host_name, device_id, action_command, key_release_ts, detected, method, duration_s, channel_info)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                host_name,
                event.device_id.clone(),
                event.action_command.clone(),
                event.key_release_ts,
                event.detected as i64,
                method,
                event.duration_s,
                channel_info,
            ],
        )
        .await?;
        Ok(())
    }

    /// Most recent events for a device, newest first, backing run-summary reporting (§4.11
    /// "Statistics per run").
    pub async fn recent(&self, host_name: &str, device_id: &str, limit: u32) -> Result<Vec<ZapEvent>, DbError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT device_id, action_command, key_release_ts, detected, method, duration_s, channel_info
                 FROM zap_events WHERE host_name = ?1 AND device_id = ?2 ORDER BY id DESC LIMIT ?3",
                params![host_name, device_id, limit as i64],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let method: Option<String> = row.get(4)?;
            let channel_info_json: Option<String> = row.get(6)?;
            out.push(ZapEvent {
                device_id: row.get(0)?,
                action_command: row.get(1)?,
                key_release_ts: row.get(2)?,
                detected: row.get::<i64>(3)? != 0,
                method: method.and_then(|m| match m.as_str() {
                    "blackscreen" => Some(ZapMethod::Blackscreen),
                    "freeze" => Some(ZapMethod::Freeze),
                    _ => None,
                }),
                duration_s: row.get(5)?,
                channel_info: channel_info_json
                    .map(|json| serde_json::from_str::<ChannelInfo>(&json))
                    .transpose()
                    .map_err(|e| DbError::MappingError(e.to_string()))?,
            });
        }
        Ok(out)
    }
}
