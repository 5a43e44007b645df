// [libs/infra/db/src/repositories/command.rs]
//! Command Registry (C2, §4.2) persistence. Unique by `(device_model, command_name)`.

use crate::errors::DbError;
use crate::DbClient;
use fleetmesh_domain_models::{CommandKind, CommandSpec};
use libsql::{params, Row};
use tracing::{info, instrument};

pub struct CommandRepository {
    client: DbClient,
}

impl CommandRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, spec), fields(device_model = %spec.device_model, command_name = %spec.command_name))]
    pub async fn upsert(&self, spec: &CommandSpec) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        let required_params_json = serde_json::to_string(&spec.required_params)
            .map_err(|e| DbError::MappingError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO commands (device_model, command_name, kind, category, description, required_params, requires_input, default_wait_time_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(device_model, command_name) DO UPDATE SET
                kind = excluded.kind,
                category = excluded.category,
                description = excluded.description,
                required_params = excluded.required_params,
                requires_input = excluded.requires_input,
                default_wait_time_ms = excluded.default_wait_time_ms
            "#,
            params![
                spec.device_model.clone(),
                spec.command_name.clone(),
                kind_str(spec.kind),
                spec.category.clone(),
                spec.description.clone(),
                required_params_json,
                spec.requires_input as i64,
                spec.default_wait_time_ms as i64,
            ],
        )
        .await?;

        info!("command spec upserted");
        Ok(())
    }

    /// Full catalog for a device_model, grouped by category at the call site (§4.6 rejection
    /// payload); this returns the flat list ordered by category then name.
    pub async fn list_for_device(&self, device_model: &str) -> Result<Vec<CommandSpec>, DbError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT device_model, command_name, kind, category, description, required_params, requires_input, default_wait_time_ms
                 FROM commands WHERE device_model = ?1 ORDER BY category, command_name",
                params![device_model],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row(row)?);
        }
        Ok(out)
    }

    pub async fn get(&self, device_model: &str, command_name: &str) -> Result<CommandSpec, DbError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT device_model, command_name, kind, category, description, required_params, requires_input, default_wait_time_ms
                 FROM commands WHERE device_model = ?1 AND command_name = ?2",
                params![device_model, command_name],
            )
            .await?;

        match rows.next().await? {
            Some(row) => map_row(row),
            None => Err(DbError::CommandNotFound {
                device_model: device_model.to_string(),
                command_name: command_name.to_string(),
            }),
        }
    }
}

fn kind_str(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::Remote => "remote",
        CommandKind::Adb => "adb",
        CommandKind::Web => "web",
        CommandKind::Ir => "ir",
    }
}

fn map_row(row: Row) -> Result<CommandSpec, DbError> {
    let kind_raw: String = row.get(2)?;
    let kind = match kind_raw.as_str() {
        "remote" => CommandKind::Remote,
        "adb" => CommandKind::Adb,
        "web" => CommandKind::Web,
        "ir" => CommandKind::Ir,
        other => return Err(DbError::MappingError(format!("unknown command kind '{other}'"))),
    };

    let required_params_json: String = row.get(5)?;
    let required_params: Vec<String> =
        serde_json::from_str(&required_params_json).map_err(|e| DbError::MappingError(e.to_string()))?;

    Ok(CommandSpec {
        device_model: row.get(0)?,
        command_name: row.get(1)?,
        kind,
        category: row.get(3)?,
        description: row.get(4)?,
        required_params,
        requires_input: row.get::<i64>(6)? != 0,
        default_wait_time_ms: row.get::<i64>(7)? as u64,
    })
}
