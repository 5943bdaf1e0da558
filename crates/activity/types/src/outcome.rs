use crate::PartySignature;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded result of completing a step
///
/// The code must come from the step's declared outcome vocabulary; the
/// action checks this when the outcome is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub code: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver: Option<PartySignature>,
    pub recorded_at: DateTime<Utc>,
}

impl Outcome {
    pub fn new(code: impl Into<String>, description: impl Into<String>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            reason: None,
            approver: None,
            recorded_at,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_approver(mut self, approver: PartySignature) -> Self {
        self.approver = Some(approver);
        self
    }
}
