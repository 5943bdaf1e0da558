use crate::ClientType;
use serde::{Deserialize, Serialize};

/// Escalate enterprise KYC that has run longer than a threshold
///
/// Advisory only. A sweeper pairs it with the overdue callbacks it finds
/// and decides what to do with the case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycEscalationRule {
    #[serde(default = "default_threshold_days")]
    pub threshold_days: i64,
}

fn default_threshold_days() -> i64 {
    5
}

impl Default for KycEscalationRule {
    fn default() -> Self {
        Self {
            threshold_days: default_threshold_days(),
        }
    }
}

impl KycEscalationRule {
    pub fn new(threshold_days: i64) -> Self {
        Self { threshold_days }
    }

    pub fn should_escalate(&self, client_type: ClientType, kyc_days: i64) -> bool {
        client_type == ClientType::Enterprise && kyc_days > self.threshold_days
    }
}
