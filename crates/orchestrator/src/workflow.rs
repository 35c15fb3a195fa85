//! Registration workflow: register, verify, process data, mint.
//!
//! Each stage checks the ledger status it requires, submits one call and
//! then waits for the oracle to move the property on. A stage never starts
//! before the previous stage's wait is satisfied.

use events::Event;
use ledger::{calls, ContractCall};
use propchain_core::{Property, PropertyId, PropertyStatus, RegistrationRequest, TokenMetadata};
use std::sync::Mutex;
use tracing::{debug, error, info};

use crate::context::WorkflowContext;
use crate::error::{Result, WorkflowError, WorkflowFailure};
use crate::metadata::{publish_metadata, PublishedMetadata};
use crate::retry::with_retry;
use crate::state_machine::{StageMachine, WorkflowStage};
use crate::step::StepReceipt;
use crate::wait::{await_condition, WaitSpec};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowReport {
    pub property_id: PropertyId,
    pub entry_stage: WorkflowStage,
    pub receipts: Vec<(WorkflowStage, StepReceipt)>,
    pub metadata: Option<PublishedMetadata>,
    pub final_status: PropertyStatus,
}

/// Progress of one run.
struct RunState {
    stage: WorkflowStage,
    last_status: Option<PropertyStatus>,
    receipts: Vec<(WorkflowStage, StepReceipt)>,
    metadata: Option<PublishedMetadata>,
}

impl RunState {
    fn new(last_status: Option<PropertyStatus>) -> Self {
        Self {
            stage: WorkflowStage::Idle,
            last_status,
            receipts: Vec::new(),
            metadata: None,
        }
    }
}

pub struct RegistrationWorkflow {
    ctx: WorkflowContext,
}

impl RegistrationWorkflow {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Run every stage from registration. A property that is not `Pending`
    /// fails at the registration precondition without submitting anything.
    pub async fn run(
        &self,
        request: &RegistrationRequest,
    ) -> std::result::Result<WorkflowReport, WorkflowFailure> {
        self.drive(request, WorkflowStage::Registering, RunState::new(None))
            .await
    }

    /// Continue from the stage matching the property's current status.
    pub async fn resume(
        &self,
        request: &RegistrationRequest,
    ) -> std::result::Result<WorkflowReport, WorkflowFailure> {
        let id = request.property_id;
        let mut state = RunState::new(None);

        let status = match self.read_status(id).await {
            Ok(status) => status,
            Err(e) => return Err(self.fail(id, &mut state, e)),
        };
        state.last_status = Some(status);

        let entry = StageMachine::entry_stage(status);
        info!(property_id = %id, status = %status, entry_stage = %entry, "Resuming workflow");
        self.drive(request, entry, state).await
    }

    async fn drive(
        &self,
        request: &RegistrationRequest,
        entry: WorkflowStage,
        mut state: RunState,
    ) -> std::result::Result<WorkflowReport, WorkflowFailure> {
        let id = request.property_id;

        info!(property_id = %id, entry_stage = %entry, "Workflow started");
        self.ctx.emit_event(Event::WorkflowStarted {
            property_id: id,
            entry_stage: entry.to_string(),
        });

        if let Err(e) = self.advance(id, &mut state, entry) {
            return Err(self.fail(id, &mut state, e));
        }

        while !state.stage.is_terminal() {
            let result = match state.stage {
                WorkflowStage::Registering => self.register(request, &mut state).await,
                WorkflowStage::Verifying => self.verify(id, &mut state).await,
                WorkflowStage::ProcessingData => self.process_data(id, &mut state).await,
                WorkflowStage::Minting => self.mint(id, &mut state).await,
                WorkflowStage::Idle | WorkflowStage::Complete | WorkflowStage::Failed => {
                    Err(WorkflowError::InvalidTransition {
                        from: state.stage,
                        to: state.stage,
                    })
                }
            };

            let next = result.and_then(|_| {
                StageMachine::next_stage(state.stage).ok_or(WorkflowError::InvalidTransition {
                    from: state.stage,
                    to: state.stage,
                })
            });

            if let Err(e) = next.and_then(|next| self.advance(id, &mut state, next)) {
                return Err(self.fail(id, &mut state, e));
            }
        }

        info!(property_id = %id, transactions = state.receipts.len(), "Workflow complete");
        self.ctx.emit_event(Event::WorkflowCompleted { property_id: id });

        Ok(WorkflowReport {
            property_id: id,
            entry_stage: entry,
            receipts: state.receipts,
            metadata: state.metadata,
            final_status: state.last_status.unwrap_or(PropertyStatus::Minted),
        })
    }

    async fn register(&self, request: &RegistrationRequest, state: &mut RunState) -> Result<()> {
        let id = request.property_id;
        self.require_status(id, state).await?;

        let receipt = self
            .submit(id, &calls::register_property(request), 1)
            .await?;
        state.receipts.push((state.stage, receipt));

        self.wait_for(id, PropertyStatus::Registered, self.ctx.oracle_wait(), state)
            .await
    }

    async fn verify(&self, id: PropertyId, state: &mut RunState) -> Result<()> {
        self.require_status(id, state).await?;

        let receipt = self
            .submit(id, &calls::process_verification(id), 1)
            .await?;
        state.receipts.push((state.stage, receipt));

        self.wait_for(id, PropertyStatus::Verified, self.ctx.oracle_wait(), state)
            .await
    }

    async fn process_data(&self, id: PropertyId, state: &mut RunState) -> Result<()> {
        self.require_status(id, state).await?;

        let call = &calls::process_property_data(id);
        let receipt = with_retry(
            &self.ctx.retry_policy(),
            WorkflowError::is_retryable,
            &self.ctx.cancel,
            move |attempt| self.submit(id, call, attempt),
        )
        .await?;
        state.receipts.push((state.stage, receipt));

        self.wait_for(id, PropertyStatus::DataReady, self.ctx.status_wait(), state)
            .await
    }

    async fn mint(&self, id: PropertyId, state: &mut RunState) -> Result<()> {
        let property = self.require_status(id, state).await?;

        let document = TokenMetadata::for_property(&property, &self.ctx.config.image_url);
        let published = publish_metadata(self.ctx.metadata_store.as_ref(), &document).await?;
        self.ctx.emit_event(Event::MetadataPublished {
            property_id: id,
            uri: published.uri.clone(),
            inline: published.inline,
        });

        let receipt = self
            .submit(id, &calls::set_token_price_and_mint(id, &published.uri), 1)
            .await?;
        state.receipts.push((state.stage, receipt));
        state.metadata = Some(published);

        self.wait_for(id, PropertyStatus::Minted, self.ctx.status_wait(), state)
            .await
    }

    /// Read the property and check the current stage's precondition.
    async fn require_status(&self, id: PropertyId, state: &mut RunState) -> Result<Property> {
        self.ctx.ensure_not_cancelled()?;

        let property = self.ctx.contract.get_property(id).await?;
        state.last_status = Some(property.status);

        if let Some(expected) = StageMachine::required_status(state.stage) {
            if property.status != expected {
                return Err(WorkflowError::PreconditionFailed {
                    stage: state.stage,
                    expected,
                    actual: property.status,
                });
            }
        }

        debug!(
            property_id = %id,
            stage = %state.stage,
            status = %property.status,
            "Precondition met"
        );
        Ok(property)
    }

    async fn submit(
        &self,
        id: PropertyId,
        call: &ContractCall,
        attempt: u32,
    ) -> Result<StepReceipt> {
        self.ctx.ensure_not_cancelled()?;
        let signer = self.ctx.signer.active_account().await?;

        self.ctx.emit_event(Event::StepSubmitted {
            property_id: id,
            method: call.method.to_string(),
            attempt,
        });

        let receipt = self
            .ctx
            .steps
            .submit(call, &signer, self.ctx.config.gas)
            .await?;

        self.ctx.emit_event(Event::StepConfirmed {
            property_id: id,
            method: receipt.method.to_string(),
            transaction_hash: receipt.transaction_hash.clone(),
        });
        Ok(receipt)
    }

    async fn wait_for(
        &self,
        id: PropertyId,
        target: PropertyStatus,
        spec: WaitSpec,
        state: &mut RunState,
    ) -> Result<()> {
        info!(
            property_id = %id,
            target_status = %target,
            timeout_secs = spec.timeout.as_secs(),
            "Waiting for status"
        );
        self.ctx.emit_event(Event::WaitStarted {
            property_id: id,
            target_status: target.to_string(),
            timeout_secs: spec.timeout.as_secs(),
        });

        let observed = Mutex::new(state.last_status);
        let slot = &observed;
        let contract = &self.ctx.contract;

        let outcome = await_condition(
            move || async move {
                let status = contract.property_status(id).await;
                if let (Ok(status), Ok(mut last)) = (&status, slot.lock()) {
                    *last = Some(*status);
                }
                status
            },
            target,
            &spec,
            &self.ctx.cancel,
        )
        .await;

        if let Ok(last) = observed.into_inner() {
            state.last_status = last;
        }
        let elapsed = outcome?;

        self.ctx.emit_event(Event::WaitSatisfied {
            property_id: id,
            target_status: target.to_string(),
            elapsed_ms: elapsed.as_millis() as u64,
        });
        Ok(())
    }

    async fn read_status(&self, id: PropertyId) -> Result<PropertyStatus> {
        self.ctx.ensure_not_cancelled()?;
        Ok(self.ctx.contract.property_status(id).await?)
    }

    fn advance(&self, id: PropertyId, state: &mut RunState, to: WorkflowStage) -> Result<()> {
        let from = state.stage;
        StageMachine::validate_transition(from, to)?;
        state.stage = to;

        info!(property_id = %id, from = %from, to = %to, "Stage transition");
        self.ctx.emit_event(Event::StageChanged {
            property_id: id,
            from_stage: from.to_string(),
            to_stage: to.to_string(),
        });
        Ok(())
    }

    fn fail(&self, id: PropertyId, state: &mut RunState, error: WorkflowError) -> WorkflowFailure {
        // The failure reports the furthest stage reached, not `Failed`.
        let stage = state.stage;
        if let Err(e) = self.advance(id, state, WorkflowStage::Failed) {
            error!(
                property_id = %id,
                stage = %stage,
                error = %e,
                "Failure raised from a terminal stage"
            );
        }

        error!(property_id = %id, stage = %stage, error = %error, "Workflow failed");
        self.ctx.emit_event(Event::WorkflowFailed {
            property_id: id,
            stage: stage.to_string(),
            last_status: state.last_status.map(|s| s.to_string()),
            message: error.to_string(),
        });

        WorkflowFailure {
            stage,
            last_status: state.last_status,
            error,
        }
    }
}
