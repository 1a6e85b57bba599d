//! Error types for the domain dashboard

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Remote storage is not configured")]
    RemoteUnconfigured,

    #[error("Remote request failed ({status}): {message}")]
    RemoteRequestFailed { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid import: {0}")]
    ImportFormatInvalid(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    /// Whether this came from the remote service (and the local store can take over)
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            DashboardError::RemoteUnconfigured
                | DashboardError::RemoteRequestFailed { .. }
                | DashboardError::Http(_)
        )
    }
}
