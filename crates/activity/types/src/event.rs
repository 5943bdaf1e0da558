//! Outbound events a case reports as it moves

use crate::{CaseId, OutcomeDirective, StageCode, StepCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events buffered by a case until released to the host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActivityEvent {
    StepCompleted {
        case_id: CaseId,
        stage_code: StageCode,
        step_code: StepCode,
        occurred_at: DateTime<Utc>,
    },
    StageAdvanced {
        case_id: CaseId,
        from: StageCode,
        to: StageCode,
        occurred_at: DateTime<Utc>,
    },
    ProcessCompleted {
        case_id: CaseId,
        occurred_at: DateTime<Utc>,
    },
    /// A resolved directive is about to be applied
    OutcomeDirectiveDispatched {
        case_id: CaseId,
        step_code: StepCode,
        directive: OutcomeDirective,
        occurred_at: DateTime<Utc>,
    },
}

impl ActivityEvent {
    pub fn case_id(&self) -> &CaseId {
        match self {
            Self::StepCompleted { case_id, .. }
            | Self::StageAdvanced { case_id, .. }
            | Self::ProcessCompleted { case_id, .. }
            | Self::OutcomeDirectiveDispatched { case_id, .. } => case_id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::StepCompleted { occurred_at, .. }
            | Self::StageAdvanced { occurred_at, .. }
            | Self::ProcessCompleted { occurred_at, .. }
            | Self::OutcomeDirectiveDispatched { occurred_at, .. } => *occurred_at,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StepCompleted { .. } => "step_completed",
            Self::StageAdvanced { .. } => "stage_advanced",
            Self::ProcessCompleted { .. } => "process_completed",
            Self::OutcomeDirectiveDispatched { .. } => "outcome_directive_dispatched",
        }
    }
}
