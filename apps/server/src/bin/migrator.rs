// [apps/server/src/bin/migrator.rs]
//! Standalone schema migration, for deploy pipelines that apply schema changes ahead of rolling
//! out a new server version rather than relying on the server's own connect-time migration.

use dotenvy::dotenv;
use fleetmesh_infra_db::DbClient;
use fleetmesh_shared_beacon::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("fleetmesh_migrator");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let database_auth_token = std::env::var("TURSO_AUTH_TOKEN").ok();

    DbClient::connect(&database_url, database_auth_token).await?;
    info!("schema migration applied");
    Ok(())
}
