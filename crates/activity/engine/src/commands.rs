//! Inbound commands and their results
//!
//! Transport adapters (webhooks, queues, CLIs) translate whatever they
//! receive into a [`Command`] and hand it to the service.

use activity_types::*;
use serde::{Deserialize, Serialize};

/// An instruction to the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    StartCase {
        case_id: CaseId,
        client_ref: String,
        scenario_code: ScenarioCode,
    },
    StartStep {
        case_id: CaseId,
        stage_code: StageCode,
        step_code: StepCode,
    },
    CompleteStep {
        case_id: CaseId,
        stage_code: StageCode,
        step_code: StepCode,
        outcome_code: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        approver: Option<PartySignature>,
    },
    /// A vendor result, correlated through its pending callback
    RecordExternalOutcome {
        external_reference: String,
        outcome_code: String,
        description: String,
        vendor: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartCase { .. } => "start_case",
            Self::StartStep { .. } => "start_step",
            Self::CompleteStep { .. } => "complete_step",
            Self::RecordExternalOutcome { .. } => "record_external_outcome",
        }
    }
}

/// What a command did
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub case_id: CaseId,
    pub case_state: CaseState,
    /// Directives applied by a step completion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<OutcomeDirective>,
    /// Result of the lifecycle handler run by a step start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<LifecycleResult>,
    /// Events the case released while handling the command
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ActivityEvent>,
}

impl CommandOutcome {
    pub fn new(case_id: CaseId, case_state: CaseState) -> Self {
        Self {
            case_id,
            case_state,
            directives: Vec::new(),
            lifecycle: None,
            events: Vec::new(),
        }
    }

    pub fn with_directives(mut self, directives: Vec<OutcomeDirective>) -> Self {
        self.directives = directives;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: LifecycleResult) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn with_events(mut self, events: Vec<ActivityEvent>) -> Self {
        self.events = events;
        self
    }
}
