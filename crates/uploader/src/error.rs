//! Upload error types.

/// Errors produced during an upload attempt.
///
/// Every variant is terminal for the current attempt; retrying means calling
/// `upload()` or `resume()` again.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("session negotiation failed: {0}")]
    Negotiation(String),

    #[error("chunk {index} failed: {reason}")]
    Transmission { index: usize, reason: String },

    #[error("finalize failed: {0}")]
    Finalize(String),

    #[error("upload paused")]
    Paused,

    #[error("cancelled")]
    Cancelled,

    #[error("transfer error: {0}")]
    Transfer(#[from] searchhub_transfer::TransferError),
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        UploadError::Http(e.to_string())
    }
}
