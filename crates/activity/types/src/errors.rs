//! Error types for the Activity layer

use crate::{ActionId, ActionState, CaseId, CaseState, ScenarioCode, StageCode, StepCode};

/// Errors that can occur in Activity operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivityError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: ActionState, to: ActionState },

    #[error("Outcome '{code}' is not a possible outcome of step {step}")]
    UnknownOutcomeCode { step: StepCode, code: String },

    #[error("Stage not found: {0}")]
    StageNotFound(StageCode),

    #[error("Step not found: {step} in stage {stage}")]
    StepNotFound { stage: StageCode, step: StepCode },

    #[error("Action not found: {0}")]
    ActionNotFound(ActionId),

    #[error("Case not found: {0}")]
    CaseNotFound(CaseId),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("No pending callback for external reference: {0}")]
    NoPendingCallback(String),

    #[error("Callback {reference} belongs to superseded action {action_id}")]
    StaleCallback { reference: String, action_id: ActionId },

    #[error("Vendor {vendor} sent a result without a callback reference")]
    MissingCallbackReference { vendor: String },

    #[error("Callback vendor mismatch: expected {expected}, got {actual}")]
    VendorMismatch { expected: String, actual: String },

    #[error("Stage {stage} cannot advance: step {step} has not reached a terminal state")]
    StageNotSettled { stage: StageCode, step: StepCode },

    #[error("Case {case_id} is closed ({state})")]
    CaseClosed { case_id: CaseId, state: CaseState },

    #[error("Duplicate case: {0}")]
    DuplicateCase(CaseId),

    #[error("Duplicate scenario: {0}")]
    DuplicateScenario(ScenarioCode),

    #[error("Unknown status '{status}' from vendor {vendor}")]
    UnknownVendorStatus { vendor: String, status: String },

    #[error("Invalid blueprint: {0}")]
    InvalidBlueprint(String),

    #[error("Lifecycle handler error: {0}")]
    Lifecycle(String),
}

impl ActivityError {
    /// True for lookup failures the caller should surface as "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::StageNotFound(_)
                | Self::StepNotFound { .. }
                | Self::ActionNotFound(_)
                | Self::CaseNotFound(_)
                | Self::ScenarioNotFound(_)
                | Self::NoPendingCallback(_)
        )
    }
}

/// Result type alias for activity operations
pub type ActivityResult<T> = Result<T, ActivityError>;
