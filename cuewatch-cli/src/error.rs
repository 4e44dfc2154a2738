use cuewatch_engine::MonitorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Monitor(#[from] MonitorError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl AppError {
    /// Rejected input that should not produce a failing exit status.
    pub fn is_url_validation(&self) -> bool {
        matches!(self, AppError::Monitor(e) if e.is_url_validation())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
