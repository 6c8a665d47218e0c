use thiserror::Error;

/// Failures below the status-code level. A non-2xx response is NOT an error:
/// it comes back as an ordinary [`super::ApiResponse`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}
