//! Error types for the advisor conversation engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Remote Service Errors
    // =============================

    #[error("Backend returned status {0}")]
    BackendStatus(reqwest::StatusCode),

    #[error("Remote call exceeded deadline of {0:?}")]
    Timeout(std::time::Duration),

    #[error("Malformed backend payload: {0}")]
    MalformedPayload(String),

    // =============================
    // Persistence Errors
    // =============================

    #[error("Session persistence error: {0}")]
    Persistence(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
