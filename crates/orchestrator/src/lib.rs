//! Drives a property through registration, verification, data processing
//! and minting, waiting on the oracle between steps.

pub mod account;
pub mod context;
pub mod error;
pub mod metadata;
pub mod retry;
pub mod state_machine;
pub mod step;
pub mod wait;
pub mod workflow;

pub use account::{AccountOperations, Holding, Portfolio, RentPayment};
pub use context::{WorkflowConfig, WorkflowContext, ACCOUNT_GAS};
pub use error::{Result, WorkflowError, WorkflowFailure};
pub use metadata::{publish_metadata, PublishedMetadata};
pub use retry::{with_retry, RetryError, RetryPolicy};
pub use state_machine::{StageMachine, WorkflowStage};
pub use step::{StepError, StepExecutor, StepReceipt};
pub use wait::{await_condition, WaitError, WaitSpec};
pub use workflow::{RegistrationWorkflow, WorkflowReport};
