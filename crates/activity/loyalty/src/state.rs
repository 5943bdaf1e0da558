use activity_types::LifecycleState;
use serde::{Deserialize, Serialize};

/// State of an incentive awarded for a member activity
///
/// ```text
/// Received → Evaluating → AwaitingSettlement → Settled
///                 ↓                               ↓
///             Rejected                        Reversed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveState {
    Received,
    Evaluating,
    AwaitingSettlement,
    Settled,
    Rejected,
    Reversed,
}

impl LifecycleState for IncentiveState {
    const ALL: &'static [Self] = &[
        Self::Received,
        Self::Evaluating,
        Self::AwaitingSettlement,
        Self::Settled,
        Self::Rejected,
        Self::Reversed,
    ];

    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Received => &[Self::Evaluating],
            Self::Evaluating => &[Self::AwaitingSettlement, Self::Rejected],
            Self::AwaitingSettlement => &[Self::Settled],
            // Chargebacks
            Self::Settled => &[Self::Reversed],
            Self::Rejected | Self::Reversed => &[],
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Rejected | Self::Reversed)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Evaluating => "evaluating",
            Self::AwaitingSettlement => "awaiting_settlement",
            Self::Settled => "settled",
            Self::Rejected => "rejected",
            Self::Reversed => "reversed",
        }
    }
}

impl std::fmt::Display for IncentiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
