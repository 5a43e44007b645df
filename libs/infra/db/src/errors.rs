// [libs/infra/db/src/errors.rs]
//! Persistence error catalog (§7 taxonomy: Validation/Contention/Transport/Semantic/Fatal
//! mapped onto the data layer's concrete failure modes).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    ConnectionError(String),

    #[error("database configuration is missing or invalid: {0}")]
    ConfigurationError(String),

    #[error("query failed: {0}")]
    QueryError(#[from] libsql::Error),

    #[error("row mapping failed: {0}")]
    MappingError(String),

    #[error("reference '{0}' not found")]
    ReferenceNotFound(String),

    #[error("command '{command_name}' not registered for device model '{device_model}'")]
    CommandNotFound { device_model: String, command_name: String },

    #[error("navigation tree '{0}' not found")]
    TreeNotFound(String),

    #[error("node '{node_id}' not found in tree '{tree_id}'")]
    NodeNotFound { tree_id: String, node_id: String },

    #[error("edge '{edge_id}' not found in tree '{tree_id}'")]
    EdgeNotFound { tree_id: String, edge_id: String },

    /// Contention category (§7): `takeControl` lost the atomic `UPDATE...RETURNING` race.
    #[error("device {device_id} on host {host_name} is already locked by another session")]
    DeviceLocked { host_name: String, device_id: String, held_by_user_id: String },

    #[error("no active lease for device {device_id} on host {host_name}")]
    LeaseNotFound { host_name: String, device_id: String },

    #[error("no capture frame recorded yet for {host_name}/{device_id}")]
    NoCaptureFrame { host_name: String, device_id: String },
}
