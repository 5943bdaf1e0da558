use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Business effects released by the process manager
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LoyaltyEvent {
    IncentiveSettled {
        campaign_id: String,
        incentive_id: String,
        member_id: String,
        outcome_code: String,
        points_granted: i64,
        occurred_at: DateTime<Utc>,
    },
    /// A chargeback cancelled a settled incentive
    IncentiveReversed {
        incentive_id: String,
        member_id: String,
        reason: String,
        occurred_at: DateTime<Utc>,
    },
}

impl LoyaltyEvent {
    pub fn incentive_id(&self) -> &str {
        match self {
            Self::IncentiveSettled { incentive_id, .. }
            | Self::IncentiveReversed { incentive_id, .. } => incentive_id,
        }
    }

    pub fn member_id(&self) -> &str {
        match self {
            Self::IncentiveSettled { member_id, .. } | Self::IncentiveReversed { member_id, .. } => {
                member_id
            }
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::IncentiveSettled { occurred_at, .. }
            | Self::IncentiveReversed { occurred_at, .. } => *occurred_at,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::IncentiveSettled { .. } => "incentive_settled",
            Self::IncentiveReversed { .. } => "incentive_reversed",
        }
    }
}
