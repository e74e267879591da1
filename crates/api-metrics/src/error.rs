use std::path::PathBuf;

use thiserror::Error;

pub type MetricsResult<T> = Result<T, MetricsError>;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("message log not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid message log: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons an `api_req_started` payload is skipped by the aggregator
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a json object")]
    NotAnObject,
}
