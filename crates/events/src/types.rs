//! Event types for workflow progress reporting

use chrono::{DateTime, Utc};
use propchain_core::PropertyId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// Position in the publishing bus, strictly increasing
    pub sequence: u64,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(sequence: u64, event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All possible events in the system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Workflow events
    /// A workflow run started at the given stage
    #[serde(rename = "workflow.started")]
    WorkflowStarted {
        property_id: PropertyId,
        entry_stage: String,
    },

    /// The workflow moved between stages
    #[serde(rename = "workflow.stage_changed")]
    StageChanged {
        property_id: PropertyId,
        from_stage: String,
        to_stage: String,
    },

    /// Every stage finished
    #[serde(rename = "workflow.completed")]
    WorkflowCompleted { property_id: PropertyId },

    /// The workflow aborted; ledger state is left as last observed
    #[serde(rename = "workflow.failed")]
    WorkflowFailed {
        property_id: PropertyId,
        stage: String,
        last_status: Option<String>,
        message: String,
    },

    // Step events
    /// A state-changing call is about to be signed and sent
    #[serde(rename = "step.submitted")]
    StepSubmitted {
        property_id: PropertyId,
        method: String,
        attempt: u32,
    },

    /// The ledger acknowledged a submitted call
    #[serde(rename = "step.confirmed")]
    StepConfirmed {
        property_id: PropertyId,
        method: String,
        transaction_hash: String,
    },

    // Wait events
    /// Polling for a status started
    #[serde(rename = "wait.started")]
    WaitStarted {
        property_id: PropertyId,
        target_status: String,
        timeout_secs: u64,
    },

    /// The awaited status was observed
    #[serde(rename = "wait.satisfied")]
    WaitSatisfied {
        property_id: PropertyId,
        target_status: String,
        elapsed_ms: u64,
    },

    // Metadata events
    /// Token metadata was stored off-chain or inlined as a data URI
    #[serde(rename = "metadata.published")]
    MetadataPublished {
        property_id: PropertyId,
        uri: String,
        inline: bool,
    },
}
