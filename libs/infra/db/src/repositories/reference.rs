// [libs/infra/db/src/repositories/reference.rs]
//! Reference Store (C1, §4.1) persistence. Unique by `(team, interface_name, name)`.

use crate::errors::DbError;
use crate::DbClient;
use fleetmesh_domain_models::{Reference, ReferenceType};
use libsql::{params, Row};
use tracing::{info, instrument};

pub struct ReferenceRepository {
    client: DbClient,
}

impl ReferenceRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, reference), fields(team = %reference.team, name = %reference.name))]
    pub async fn upsert(&self, reference: &Reference) -> Result<(), DbError> {
        let conn = self.client.connection()?;
        conn.execute(
            r#"
            INSERT INTO refs (team, interface_name, name, reference_type, area_x, area_y, area_w, area_h, image_url, text, language, modified)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(team, interface_name, name) DO UPDATE SET
                reference_type = excluded.reference_type,
                area_x = excluded.area_x,
                area_y = excluded.area_y,
                area_w = excluded.area_w,
                area_h = excluded.area_h,
                image_url = excluded.image_url,
                text = excluded.text,
                language = excluded.language,
                modified = 1
            "#,
            params![
                reference.team.clone(),
                reference.interface_name.clone(),
                reference.name.clone(),
                reference_type_str(reference.reference_type),
                reference.area.x,
                reference.area.y,
                reference.area.w,
                reference.area.h,
                reference.image_url.clone(),
                reference.text.clone(),
                reference.language.clone(),
                reference.modified as i64,
            ],
        )
        .await?;

        info!("reference upserted");
        Ok(())
    }

    pub async fn get(&self, team: &str, interface_name: &str, name: &str) -> Result<Reference, DbError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT team, interface_name, name, reference_type, area_x, area_y, area_w, area_h, image_url, text, language, modified
                 FROM refs WHERE team = ?1 AND interface_name = ?2 AND name = ?3",
                params![team, interface_name, name],
            )
            .await?;

        match rows.next().await? {
            Some(row) => map_row(row),
            None => Err(DbError::ReferenceNotFound(name.to_string())),
        }
    }

    pub async fn list_for_interface(&self, team: &str, interface_name: &str) -> Result<Vec<Reference>, DbError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT team, interface_name, name, reference_type, area_x, area_y, area_w, area_h, image_url, text, language, modified
                 FROM refs WHERE team = ?1 AND interface_name = ?2 ORDER BY name",
                params![team, interface_name],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row(row)?);
        }
        Ok(out)
    }
}

fn reference_type_str(t: ReferenceType) -> &'static str {
    match t {
        ReferenceType::Image => "image",
        ReferenceType::Text => "text",
    }
}

fn map_row(row: Row) -> Result<Reference, DbError> {
    use fleetmesh_domain_models::Area;

    let reference_type_raw: String = row.get(3)?;
    let reference_type = match reference_type_raw.as_str() {
        "image" => ReferenceType::Image,
        "text" => ReferenceType::Text,
        other => return Err(DbError::MappingError(format!("unknown reference_type '{other}'"))),
    };

    Ok(Reference {
        team: row.get(0)?,
        interface_name: row.get(1)?,
        name: row.get(2)?,
        reference_type,
        area: Area {
            x: row.get(4)?,
            y: row.get(5)?,
            w: row.get(6)?,
            h: row.get(7)?,
        },
        image_url: row.get(8)?,
        text: row.get(9)?,
        language: row.get(10)?,
        modified: row.get::<i64>(11)? != 0,
    })
}
