// [libs/infra/db/src/repositories/lease.rs]
//! Lock Manager (C7, §4.7) persistence. `takeControl` is a single atomic `INSERT ... ON
//! CONFLICT DO UPDATE ... WHERE expired RETURNING` round trip (§4.7): either the device had no
//! lease, or its lease had already expired, or the upsert's WHERE clause skips the row entirely
//! and nothing is returned — this is the difference between a real mutex and a
//! check-then-act race under concurrent callers.

use crate::errors::DbError;
use crate::DbClient;
use chrono::{DateTime, Utc};
use fleetmesh_domain_models::DeviceLease;
use libsql::{params, Connection, Row};
use tracing::{error, info, instrument, warn};

pub struct LeaseRepository {
    client: DbClient,
}

impl LeaseRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self), fields(host_name, device_id, session_id))]
    pub async fn take_control(
        &self,
        host_name: &str,
        device_id: &str,
        session_id: &str,
        user_id: &str,
        tree_id: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Result<DeviceLease, DbError> {
        let conn = self.client.connection()?;

        let mut rows = conn
            .query(
                r#"
                INSERT INTO device_leases (host_name, device_id, session_id, user_id, tree_id, acquired_at, expires_at)
                VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP, ?6)
                ON CONFLICT(host_name, device_id) DO UPDATE SET
                    session_id = excluded.session_id,
                    user_id = excluded.user_id,
                    tree_id = excluded.tree_id,
                    acquired_at = CURRENT_TIMESTAMP,
                    expires_at = excluded.expires_at
                WHERE device_leases.expires_at < CURRENT_TIMESTAMP
                RETURNING host_name, device_id, session_id, user_id, tree_id, acquired_at, expires_at
                "#,
                params![host_name, device_id, session_id, user_id, tree_id, expires_at.to_rfc3339()],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            info!("lease acquired");
            return map_row(row);
        }

        let held_by = self.current_holder(&conn, host_name, device_id).await?;
        warn!(held_by_user_id = %held_by, "device already locked");
        Err(DbError::DeviceLocked {
            host_name: host_name.to_string(),
            device_id: device_id.to_string(),
            held_by_user_id: held_by,
        })
    }

    async fn current_holder(&self, conn: &libsql::Connection, host_name: &str, device_id: &str) -> Result<String, DbError> {
        let mut rows = conn
            .query(
                "SELECT user_id FROM device_leases WHERE host_name = ?1 AND device_id = ?2",
                params![host_name, device_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(row.get(0)?),
            None => Ok("unknown".to_string()),
        }
    }

    /// Idempotent: succeeds whether the caller owns the lease or it is already absent (§4.7).
    /// Only refuses when a *different* session currently holds it.
    #[instrument(skip(self))]
    pub async fn release_control(&self, host_name: &str, device_id: &str, session_id: &str) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        conn.execute(
            "DELETE FROM device_leases WHERE host_name = ?1 AND device_id = ?2 AND session_id = ?3",
            params![host_name, device_id, session_id],
        )
        .await?;
        info!("release_control is idempotent; absent or foreign leases are left untouched");
        Ok(())
    }

    pub async fn get(&self, host_name: &str, device_id: &str) -> Result<DeviceLease, DbError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT host_name, device_id, session_id, user_id, tree_id, acquired_at, expires_at
                 FROM device_leases WHERE host_name = ?1 AND device_id = ?2",
                params![host_name, device_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => map_row(row),
            None => Err(DbError::LeaseNotFound { host_name: host_name.to_string(), device_id: device_id.to_string() }),
        }
    }

    /// Reaps expired leases (background daemon, §10), one host at a time: a host with a stuck
    /// or failing reclaim doesn't block reclaiming leases belonging to every other host in the
    /// same sweep (§4.7: a reaper sweep must not stall fleet-wide on one bad host).
    #[instrument(skip(self))]
    pub async fn reap_expired(&self) -> Result<u64, DbError> {
        let conn = self.client.connection()?;
        let hosts = self.expired_hosts(&conn).await?;

        let mut total = 0u64;
        for host_name in hosts {
            match self.reap_expired_for_host(&conn, &host_name).await {
                Ok(reclaimed) => {
                    if reclaimed > 0 {
                        info!(host_name = %host_name, reclaimed, "reaped expired leases for host");
                    }
                    total += reclaimed;
                }
                Err(e) => {
                    error!(host_name = %host_name, error = %e, "failed to reap expired leases for host, continuing with remaining hosts");
                }
            }
        }
        Ok(total)
    }

    async fn expired_hosts(&self, conn: &Connection) -> Result<Vec<String>, DbError> {
        let mut rows = conn
            .query("SELECT DISTINCT host_name FROM device_leases WHERE expires_at < CURRENT_TIMESTAMP", ())
            .await?;

        let mut hosts = Vec::new();
        while let Some(row) = rows.next().await? {
            hosts.push(row.get(0)?);
        }
        Ok(hosts)
    }

    async fn reap_expired_for_host(&self, conn: &Connection, host_name: &str) -> Result<u64, DbError> {
        let mut rows = conn
            .query(
                "DELETE FROM device_leases WHERE host_name = ?1 AND expires_at < CURRENT_TIMESTAMP RETURNING device_id",
                params![host_name],
            )
            .await?;

        let mut count = 0u64;
        while rows.next().await?.is_some() {
            count += 1;
        }
        Ok(count)
    }
}

fn map_row(row: Row) -> Result<DeviceLease, DbError> {
    let acquired_at: String = row.get(5)?;
    let expires_at: String = row.get(6)?;

    Ok(DeviceLease {
        host_name: row.get(0)?,
        device_id: row.get(1)?,
        session_id: row.get(2)?,
        user_id: row.get(3)?,
        tree_id: row.get(4)?,
        acquired_at: parse_datetime(&acquired_at)?,
        expires_at: parse_datetime(&expires_at)?,
    })
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        })
        .map_err(|e| DbError::MappingError(format!("invalid timestamp '{raw}': {e}")))
}
