//! [libs/domain/models/src/telemetry.rs]
//! Ambient system log shape used by the server's unified log buffer (SPEC_FULL §10).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemLog {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub component: String,
    pub message: String,
}
