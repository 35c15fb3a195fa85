use events::{Event, EventBus};
use ledger::{PropertyContract, Signer, DEFAULT_GAS};
use pinning::MetadataStore;
use propchain_core::DEFAULT_TOKEN_IMAGE;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, WorkflowError};
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BACKOFF};
use crate::step::StepExecutor;
use crate::wait::{
    WaitSpec, DEFAULT_WAIT_TIMEOUT, ORACLE_POLL_INTERVAL, POLL_ERROR_BACKOFF, STATUS_POLL_INTERVAL,
};

/// Gas budget for `claimRewards` and `payRent`.
pub const ACCOUNT_GAS: u64 = 400_000;

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub gas: u64,
    pub account_gas: u64,
    pub status_poll_interval: Duration,
    pub oracle_poll_interval: Duration,
    pub poll_error_backoff: Duration,
    pub wait_timeout: Duration,
    pub retry_max_attempts: u32,
    pub retry_backoff: Duration,
    pub image_url: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            gas: DEFAULT_GAS,
            account_gas: ACCOUNT_GAS,
            status_poll_interval: STATUS_POLL_INTERVAL,
            oracle_poll_interval: ORACLE_POLL_INTERVAL,
            poll_error_backoff: POLL_ERROR_BACKOFF,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            retry_max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            image_url: DEFAULT_TOKEN_IMAGE.to_string(),
        }
    }
}

impl WorkflowConfig {
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_account_gas(mut self, gas: u64) -> Self {
        self.account_gas = gas;
        self
    }

    pub fn with_poll_intervals(mut self, status: Duration, oracle: Duration) -> Self {
        self.status_poll_interval = status;
        self.oracle_poll_interval = oracle;
        self
    }

    pub fn with_poll_error_backoff(mut self, backoff: Duration) -> Self {
        self.poll_error_backoff = backoff;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.retry_max_attempts = max_attempts;
        self.retry_backoff = backoff;
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }
}

/// Everything a workflow run needs, passed explicitly.
#[derive(Clone)]
pub struct WorkflowContext {
    pub contract: PropertyContract,
    pub steps: StepExecutor,
    pub signer: Arc<dyn Signer>,
    pub metadata_store: Arc<dyn MetadataStore>,
    pub config: WorkflowConfig,
    pub event_bus: Option<EventBus>,
    pub cancel: CancellationToken,
}

impl WorkflowContext {
    pub fn new(
        contract: PropertyContract,
        signer: Arc<dyn Signer>,
        metadata_store: Arc<dyn MetadataStore>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            steps: StepExecutor::new(contract.clone()),
            contract,
            signer,
            metadata_store,
            config,
            event_bus: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn emit_event(&self, event: Event) {
        if let Some(ref bus) = self.event_bus {
            bus.publish(event);
        }
    }

    pub fn status_wait(&self) -> WaitSpec {
        WaitSpec {
            interval: self.config.status_poll_interval,
            error_backoff: self.config.poll_error_backoff,
            timeout: self.config.wait_timeout,
        }
    }

    pub fn oracle_wait(&self) -> WaitSpec {
        WaitSpec {
            interval: self.config.oracle_poll_interval,
            ..self.status_wait()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.config.retry_max_attempts,
            backoff: self.config.retry_backoff,
        }
    }

    pub fn ensure_not_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(WorkflowError::Cancelled)
        } else {
            Ok(())
        }
    }
}
