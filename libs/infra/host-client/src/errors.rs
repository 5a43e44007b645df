// [libs/infra/host-client/src/errors.rs]
//! Transport-category failures (§7) for calls into a host-agent's RPC surface.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostClientError {
    #[error("failed to reach host agent: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("host agent at {base_url} timed out after {attempts} attempt(s)")]
    Timeout { base_url: String, attempts: u32 },

    #[error("host agent rejected the request: {status} {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to decode host agent response: {0}")]
    Decode(String),
}
