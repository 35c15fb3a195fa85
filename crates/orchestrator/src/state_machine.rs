use propchain_core::PropertyStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WorkflowError};

/// Stages of the registration workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Idle,
    Registering,
    Verifying,
    ProcessingData,
    Minting,
    Complete,
    Failed,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Registering => "registering",
            Self::Verifying => "verifying",
            Self::ProcessingData => "processing_data",
            Self::Minting => "minting",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct StageMachine;

impl StageMachine {
    pub fn validate_transition(from: WorkflowStage, to: WorkflowStage) -> Result<()> {
        if Self::allowed_transitions(from).contains(&to) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition { from, to })
        }
    }

    fn allowed_transitions(from: WorkflowStage) -> Vec<WorkflowStage> {
        use WorkflowStage::*;

        match from {
            // A resumed run may enter at any stage.
            Idle => vec![Registering, Verifying, ProcessingData, Minting, Complete, Failed],
            Registering => vec![Verifying, Failed],
            Verifying => vec![ProcessingData, Failed],
            ProcessingData => vec![Minting, Failed],
            Minting => vec![Complete, Failed],
            Complete | Failed => vec![],
        }
    }

    pub fn next_stage(current: WorkflowStage) -> Option<WorkflowStage> {
        match current {
            WorkflowStage::Idle => Some(WorkflowStage::Registering),
            WorkflowStage::Registering => Some(WorkflowStage::Verifying),
            WorkflowStage::Verifying => Some(WorkflowStage::ProcessingData),
            WorkflowStage::ProcessingData => Some(WorkflowStage::Minting),
            WorkflowStage::Minting => Some(WorkflowStage::Complete),
            WorkflowStage::Complete | WorkflowStage::Failed => None,
        }
    }

    /// Stage whose precondition the given ledger status satisfies.
    pub fn entry_stage(status: PropertyStatus) -> WorkflowStage {
        match status {
            PropertyStatus::Pending => WorkflowStage::Registering,
            PropertyStatus::Registered => WorkflowStage::Verifying,
            PropertyStatus::Verified => WorkflowStage::ProcessingData,
            PropertyStatus::DataReady => WorkflowStage::Minting,
            PropertyStatus::Minted => WorkflowStage::Complete,
        }
    }

    /// Ledger status a stage requires before it submits anything.
    pub fn required_status(stage: WorkflowStage) -> Option<PropertyStatus> {
        match stage {
            WorkflowStage::Registering => Some(PropertyStatus::Pending),
            WorkflowStage::Verifying => Some(PropertyStatus::Registered),
            WorkflowStage::ProcessingData => Some(PropertyStatus::Verified),
            WorkflowStage::Minting => Some(PropertyStatus::DataReady),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn can_transition(from: WorkflowStage, to: WorkflowStage) -> bool {
        StageMachine::validate_transition(from, to).is_ok()
    }

    #[test]
    fn test_valid_transitions() {
        assert!(can_transition(
            WorkflowStage::Idle,
            WorkflowStage::Registering
        ));
        assert!(can_transition(
            WorkflowStage::Registering,
            WorkflowStage::Verifying
        ));
        assert!(can_transition(
            WorkflowStage::Minting,
            WorkflowStage::Complete
        ));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!can_transition(
            WorkflowStage::Registering,
            WorkflowStage::Minting
        ));
        assert!(!can_transition(
            WorkflowStage::Verifying,
            WorkflowStage::Registering
        ));
        assert!(!can_transition(
            WorkflowStage::Complete,
            WorkflowStage::Failed
        ));
    }

    #[test]
    fn test_failed_reachable_from_every_non_terminal_stage() {
        for stage in [
            WorkflowStage::Idle,
            WorkflowStage::Registering,
            WorkflowStage::Verifying,
            WorkflowStage::ProcessingData,
            WorkflowStage::Minting,
        ] {
            assert!(can_transition(stage, WorkflowStage::Failed));
        }
    }

    #[test]
    fn test_next_stage() {
        assert_eq!(
            StageMachine::next_stage(WorkflowStage::ProcessingData),
            Some(WorkflowStage::Minting)
        );
        assert_eq!(StageMachine::next_stage(WorkflowStage::Complete), None);
    }

    #[test]
    fn test_entry_stage_matches_required_status() {
        for status in [
            PropertyStatus::Pending,
            PropertyStatus::Registered,
            PropertyStatus::Verified,
            PropertyStatus::DataReady,
        ] {
            let stage = StageMachine::entry_stage(status);
            assert_eq!(StageMachine::required_status(stage), Some(status));
        }
        assert_eq!(
            StageMachine::entry_stage(PropertyStatus::Minted),
            WorkflowStage::Complete
        );
    }
}
