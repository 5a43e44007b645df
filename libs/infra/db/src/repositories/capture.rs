// [libs/infra/db/src/repositories/capture.rs]
//! Capture frame record persistence (§4.9/§4.10, §3 "ambient persistence shape"). Ephemeral:
//! rows are retention-pruned by a background daemon, not a user-facing aggregate.

use crate::errors::DbError;
use crate::DbClient;
use chrono::{DateTime, Utc};
use fleetmesh_domain_models::{CaptureFrameRecord, FrameAnalysis};
use libsql::{params, Row};
use tracing::instrument;

pub struct CaptureRepository {
    client: DbClient,
}

impl CaptureRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, record), fields(host_name, device_id = %record.device_id, sequence = record.sequence))]
    pub async fn record_frame(&self, host_name: &str, record: &CaptureFrameRecord) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        let analysis_json = serde_json::to_string(&record.analysis).map_err(|e| DbError::MappingError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO capture_frame_records (host_name, device_id, sequence, timestamp, image_url, analysis)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(host_name, device_id, sequence) DO UPDATE SET
                timestamp = excluded.timestamp,
                image_url = excluded.image_url,
                analysis = excluded.analysis
            "#,
            params![
                host_name,
                record.device_id.clone(),
                record.sequence as i64,
                record.timestamp.to_rfc3339(),
                record.image_url.clone(),
                analysis_json,
            ],
        )
        .await?;
        Ok(())
    }

    /// Most recent frame for `(host_name, device_id)`, backing `takeScreenshot`/`getLatestJson`.
    pub async fn latest(&self, host_name: &str, device_id: &str) -> Result<CaptureFrameRecord, DbError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT device_id, sequence, timestamp, image_url, analysis FROM capture_frame_records
                 WHERE host_name = ?1 AND device_id = ?2 ORDER BY sequence DESC LIMIT 1",
                params![host_name, device_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => map_row(row),
            None => Err(DbError::NoCaptureFrame { host_name: host_name.to_string(), device_id: device_id.to_string() }),
        }
    }

    /// Full set, handed to the pure retention policy (§4.9) which decides what to prune.
    pub async fn list_all(&self) -> Result<Vec<(String, CaptureFrameRecord)>, DbError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT host_name, device_id, sequence, timestamp, image_url, analysis FROM capture_frame_records",
                (),
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let host_name: String = row.get(0)?;
            out.push((host_name, map_row_with_offset(row, 1)?));
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, host_name: &str, device_id: &str, sequence: u64) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        conn.execute(
            "DELETE FROM capture_frame_records WHERE host_name = ?1 AND device_id = ?2 AND sequence = ?3",
            params![host_name, device_id, sequence as i64],
        )
        .await?;
        Ok(())
    }
}

fn map_row(row: Row) -> Result<CaptureFrameRecord, DbError> {
    map_row_with_offset(row, 0)
}

fn map_row_with_offset(row: Row, offset: i32) -> Result<CaptureFrameRecord, DbError> {
    let timestamp: String = row.get(offset + 2)?;
    let analysis_json: String = row.get(offset + 4)?;
    let analysis: FrameAnalysis = serde_json::from_str(&analysis_json).map_err(|e| DbError::MappingError(e.to_string()))?;

    Ok(CaptureFrameRecord {
        device_id: row.get(offset)?,
        sequence: row.get::<i64>(offset + 1)? as u64,
        timestamp: parse_datetime(&timestamp)?,
        image_url: row.get(offset + 3)?,
        analysis,
    })
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::MappingError(format!("invalid timestamp '{raw}': {e}")))
}
