// [libs/infra/db/src/client.rs]
//! Connection management for the libSQL-backed persistence layer. Supports both a local/file
//! URL and a remote Turso-compatible endpoint; an in-memory anchor connection keeps a
//! `:memory:` database alive across pooled connections for tests.

use crate::errors::DbError;
use crate::schema::apply_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct DbClient {
    driver: Arc<Database>,
    _memory_anchor: Option<Arc<Connection>>,
}

impl DbClient {
    #[instrument(skip(auth_token))]
    pub async fn connect(url: &str, auth_token: Option<String>) -> Result<Self, DbError> {
        if url.is_empty() {
            return Err(DbError::ConfigurationError("DATABASE_URL is empty".into()));
        }

        info!(url, "connecting to database");

        let is_remote = url.starts_with("libsql://") || url.starts_with("https://");
        let is_memory = url.contains(":memory:") || url.contains("mode=memory");

        let driver = if is_remote {
            let token = auth_token
                .ok_or_else(|| DbError::ConfigurationError("remote database requires an auth token".into()))?;
            Builder::new_remote(url.to_string(), token).build().await
        } else {
            Builder::new_local(url).build().await
        }
        .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        let driver = Arc::new(driver);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = driver.connect().map_err(|e| DbError::ConnectionError(e.to_string()))?;
            apply_schema(&anchor_conn).await.map_err(|e| DbError::ConnectionError(e.to_string()))?;
            anchor = Some(Arc::new(anchor_conn));
        } else {
            let bootstrap_conn = driver.connect().map_err(|e| DbError::ConnectionError(e.to_string()))?;
            apply_schema(&bootstrap_conn).await.map_err(|e| DbError::ConnectionError(e.to_string()))?;
        }

        Ok(Self { driver, _memory_anchor: anchor })
    }

    pub fn connection(&self) -> Result<Connection, DbError> {
        self.driver.connect().map_err(|e| {
            error!(error = %e, "failed to allocate a connection");
            DbError::ConnectionError(e.to_string())
        })
    }
}
