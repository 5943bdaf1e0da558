use crate::{ActivityCategory, CampaignStatus, IncentiveState};

/// Errors raised by the incentive machine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IncentiveError {
    #[error("Invalid incentive transition from {from} to {to}")]
    InvalidStateTransition {
        from: IncentiveState,
        to: IncentiveState,
    },

    #[error("Decision credits member {actual}, incentive belongs to {expected}")]
    MemberMismatch { expected: String, actual: String },

    #[error("Decision for a settlement carries no journal entry or reward")]
    EmptyDecision,

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Incentive {0} has no approved decision to settle")]
    NoApprovedDecision(String),

    #[error("Invalid campaign transition from {from} to {to}")]
    InvalidCampaignTransition {
        from: CampaignStatus,
        to: CampaignStatus,
    },

    #[error("Campaign {campaign_id} is not active ({status})")]
    CampaignNotActive {
        campaign_id: String,
        status: CampaignStatus,
    },

    #[error("Campaign {campaign_id} has no {category} category")]
    CategoryNotInCampaign {
        campaign_id: String,
        category: ActivityCategory,
    },

    #[error("Incentive {incentive_id} was not recorded in campaign {campaign_id}")]
    UnknownIncentive {
        campaign_id: String,
        incentive_id: String,
    },
}

/// Result type for incentive operations
pub type IncentiveResult<T> = Result<T, IncentiveError>;
