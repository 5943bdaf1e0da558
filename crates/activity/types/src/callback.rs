use crate::{ActionId, CaseId, StageCode, StepCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Correlates an in-flight vendor request with the step awaiting its result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCallback {
    pub action_id: ActionId,
    pub case_id: CaseId,
    pub stage_code: StageCode,
    pub step_code: StepCode,
    /// Vendor correlation id
    pub external_reference: String,
    pub vendor: String,
    pub expected_callback_by: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved: bool,
}

impl PendingCallback {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        action_id: ActionId,
        case_id: CaseId,
        stage_code: StageCode,
        step_code: StepCode,
        external_reference: impl Into<String>,
        vendor: impl Into<String>,
        expected_callback_by: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            action_id,
            case_id,
            stage_code,
            step_code,
            external_reference: external_reference.into(),
            vendor: vendor.into(),
            expected_callback_by,
            created_at,
            resolved: false,
        }
    }

    /// True strictly after the deadline.
    ///
    /// Pure: resolution does not rewrite whether the deadline was missed.
    /// Sweepers filter resolved callbacks themselves.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.expected_callback_by
    }

    pub fn mark_resolved(&mut self) {
        self.resolved = true;
    }
}
