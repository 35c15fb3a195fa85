//! Transaction step executor.
//!
//! Submits exactly one state-changing call per [`StepExecutor::submit`] and
//! waits for the ledger's acknowledgment. Retrying is the caller's decision.

use ledger::{Address, ContractCall, LedgerError, PropertyContract, SendOptions};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Acknowledged submission of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReceipt {
    pub method: &'static str,
    pub transaction_hash: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("Signer declined: {0}")]
    UserRejected(String),

    #[error("Reverted: {reason}")]
    Reverted { reason: String },

    #[error("Oracle data not ready: {reason}")]
    OracleNotReady { reason: String },

    #[error("Unreachable: {0}")]
    Unreachable(String),
}

impl From<LedgerError> for StepError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::UserRejected(message) => Self::UserRejected(message),
            LedgerError::Reverted { reason } => Self::Reverted { reason },
            LedgerError::OracleNotReady { reason } => Self::OracleNotReady { reason },
            LedgerError::NoAccount => Self::UserRejected(e.to_string()),
            LedgerError::Unreachable(_)
            | LedgerError::InvalidResponse(_)
            | LedgerError::InvalidAddress(_) => Self::Unreachable(e.to_string()),
        }
    }
}

pub type StepResult = std::result::Result<StepReceipt, StepError>;

#[derive(Clone)]
pub struct StepExecutor {
    contract: PropertyContract,
}

impl StepExecutor {
    pub fn new(contract: PropertyContract) -> Self {
        Self { contract }
    }

    pub async fn submit(&self, call: &ContractCall, signer: &Address, gas: u64) -> StepResult {
        self.submit_with_options(call, SendOptions::new(signer.clone(), gas))
            .await
    }

    /// Submit a payable call carrying `value` wei.
    pub async fn submit_payable(
        &self,
        call: &ContractCall,
        signer: &Address,
        gas: u64,
        value: &str,
    ) -> StepResult {
        self.submit_with_options(call, SendOptions::new(signer.clone(), gas).with_value(value))
            .await
    }

    async fn submit_with_options(&self, call: &ContractCall, options: SendOptions) -> StepResult {
        debug!(method = call.method, from = %options.from, gas = options.gas, "Submitting step");

        match self.contract.submit(call, &options).await {
            Ok(receipt) => {
                info!(
                    method = call.method,
                    transaction_hash = %receipt.transaction_hash,
                    "Step acknowledged"
                );
                Ok(StepReceipt {
                    method: call.method,
                    transaction_hash: receipt.transaction_hash,
                })
            }
            Err(e) => {
                let error = StepError::from(e);
                warn!(method = call.method, error = %error, "Step failed");
                Err(error)
            }
        }
    }
}
