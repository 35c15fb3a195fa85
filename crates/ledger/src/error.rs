use propchain_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("User rejected the request: {0}")]
    UserRejected(String),

    #[error("Transaction reverted: {reason}")]
    Reverted { reason: String },

    /// A revert whose reason says the oracle has not delivered yet.
    #[error("Oracle data not ready: {reason}")]
    OracleNotReady { reason: String },

    #[error("Ledger unreachable: {0}")]
    Unreachable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("No signing account available")]
    NoAccount,
}

impl LedgerError {
    pub fn is_oracle_not_ready(&self) -> bool {
        matches!(self, Self::OracleNotReady { .. })
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Unreachable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}

impl From<CoreError> for LedgerError {
    fn from(e: CoreError) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
