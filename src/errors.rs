use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failures of the embedded store. None of these reach a caller of the
/// resolver; they only decide that the next tier is consulted.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database {0} not found")]
    DatabaseMissing(String),

    #[error("collection {0} not found")]
    CollectionMissing(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("collection is not a JSON array: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("static resource I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("static resource request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("static resource answered with status {0}")]
    Status(u16),

    #[error("static resource is not valid analytics data: {0}")]
    Parse(#[from] serde_json::Error),
}
