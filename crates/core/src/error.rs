use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid property id: {0}")]
    InvalidPropertyId(String),

    #[error("Unknown property status: {0}")]
    UnknownStatus(String),

    #[error("Malformed property record: {0}")]
    MalformedRecord(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
