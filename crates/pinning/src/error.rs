use thiserror::Error;

#[derive(Debug, Error)]
pub enum PinningError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pinning credentials are not configured")]
    MissingCredentials,

    #[error("Pinning service error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),
}

pub type Result<T> = std::result::Result<T, PinningError>;
