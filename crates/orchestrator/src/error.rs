use ledger::LedgerError;
use propchain_core::{CoreError, PropertyStatus};
use std::time::Duration;
use thiserror::Error;

use crate::retry::RetryError;
use crate::state_machine::WorkflowStage;
use crate::step::StepError;
use crate::wait::WaitError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Rejected by signer: {0}")]
    UserRejected(String),

    #[error("Cannot start {stage}: expected status {expected}, found {actual}")]
    PreconditionFailed {
        stage: WorkflowStage,
        expected: PropertyStatus,
        actual: PropertyStatus,
    },

    #[error("Oracle data not ready yet: {reason}")]
    TransientOracleNotReady { reason: String },

    #[error("Oracle did not deliver after {attempts} attempts: {reason}")]
    RetryExhausted { attempts: u32, reason: String },

    #[error("Status {target} not reached within {}s", .elapsed.as_secs())]
    Timeout {
        target: PropertyStatus,
        elapsed: Duration,
    },

    #[error("Ledger unreachable: {0}")]
    Unreachable(String),

    #[error("Transaction reverted: {reason}")]
    Reverted { reason: String },

    #[error("Workflow cancelled")]
    Cancelled,

    #[error("Invalid stage transition from {from} to {to}")]
    InvalidTransition {
        from: WorkflowStage,
        to: WorkflowStage,
    },

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl WorkflowError {
    /// Whether the retry policy may re-submit the failed step.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientOracleNotReady { .. })
    }
}

impl From<StepError> for WorkflowError {
    fn from(e: StepError) -> Self {
        match e {
            StepError::UserRejected(message) => Self::UserRejected(message),
            StepError::Reverted { reason } => Self::Reverted { reason },
            StepError::OracleNotReady { reason } => Self::TransientOracleNotReady { reason },
            StepError::Unreachable(message) => Self::Unreachable(message),
        }
    }
}

impl From<LedgerError> for WorkflowError {
    fn from(e: LedgerError) -> Self {
        StepError::from(e).into()
    }
}

impl From<WaitError> for WorkflowError {
    fn from(e: WaitError) -> Self {
        match e {
            WaitError::Timeout { target, elapsed } => Self::Timeout { target, elapsed },
            WaitError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<RetryError<WorkflowError>> for WorkflowError {
    fn from(e: RetryError<WorkflowError>) -> Self {
        match e {
            RetryError::Exhausted { attempts, last } => Self::RetryExhausted {
                attempts,
                reason: match last {
                    Self::TransientOracleNotReady { reason } => reason,
                    other => other.to_string(),
                },
            },
            RetryError::Failed(e) => e,
            RetryError::Cancelled => Self::Cancelled,
        }
    }
}

impl From<CoreError> for WorkflowError {
    fn from(e: CoreError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Terminal failure of a workflow run.
///
/// Ledger state is left as last observed; `stage` is the furthest stage the
/// run reached, so the caller can resume from there.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{stage} failed: {error}")]
pub struct WorkflowFailure {
    pub stage: WorkflowStage,
    pub last_status: Option<PropertyStatus>,
    #[source]
    pub error: WorkflowError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_oracle_not_ready_is_retryable() {
        assert!(WorkflowError::TransientOracleNotReady {
            reason: "Invalid data".to_string()
        }
        .is_retryable());
        assert!(!WorkflowError::UserRejected("no".to_string()).is_retryable());
        assert!(!WorkflowError::Reverted {
            reason: "Invalid data".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_ledger_errors_map_to_taxonomy() {
        assert_eq!(
            WorkflowError::from(LedgerError::OracleNotReady {
                reason: "Invalid data".to_string()
            }),
            WorkflowError::TransientOracleNotReady {
                reason: "Invalid data".to_string()
            }
        );
        assert!(matches!(
            WorkflowError::from(LedgerError::InvalidResponse("bad".to_string())),
            WorkflowError::Unreachable(_)
        ));
    }

    #[test]
    fn test_retry_exhaustion_keeps_reason() {
        let err = WorkflowError::from(RetryError::Exhausted {
            attempts: 2,
            last: WorkflowError::TransientOracleNotReady {
                reason: "Invalid data".to_string(),
            },
        });
        assert_eq!(
            err,
            WorkflowError::RetryExhausted {
                attempts: 2,
                reason: "Invalid data".to_string()
            }
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = WorkflowError::Timeout {
            target: PropertyStatus::Registered,
            elapsed: Duration::from_secs(300),
        };
        assert_eq!(err.to_string(), "Status registered not reached within 300s");
    }

    #[test]
    fn test_failure_display() {
        let failure = WorkflowFailure {
            stage: WorkflowStage::Verifying,
            last_status: Some(PropertyStatus::Pending),
            error: WorkflowError::Cancelled,
        };
        assert_eq!(failure.to_string(), "verifying failed: Workflow cancelled");
    }
}
