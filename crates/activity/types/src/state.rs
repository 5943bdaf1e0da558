//! State machines for actions and cases
//!
//! Every action-like machine declares its legal moves in a transition
//! table and answers the same capability questions through
//! [`LifecycleState`]. Legality is never encoded in type hierarchies.

use serde::{Deserialize, Serialize};

/// Capability shared by every state enum that drives an action-like machine
pub trait LifecycleState: Copy + Eq + std::fmt::Debug + 'static {
    /// Every state of the machine, in declaration order
    const ALL: &'static [Self];

    /// States reachable from this one in a single transition
    fn valid_transitions(&self) -> &'static [Self];

    /// Whether no further work is expected in this state
    fn is_terminal(&self) -> bool;

    /// Stable snake_case name
    fn as_str(&self) -> &'static str;

    fn can_transition_to(&self, target: Self) -> bool {
        self.valid_transitions().contains(&target)
    }
}

// ── Action State ─────────────────────────────────────────────────────

/// State of a single action (step instance)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    Draft,
    Pending,
    InProgress,
    AwaitingApproval,
    Completed,
    Failed,
    OnHold,
    Escalated,
}

impl LifecycleState for ActionState {
    const ALL: &'static [Self] = &[
        Self::Draft,
        Self::Pending,
        Self::InProgress,
        Self::AwaitingApproval,
        Self::Completed,
        Self::Failed,
        Self::OnHold,
        Self::Escalated,
    ];

    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Pending],
            Self::Pending => &[Self::InProgress, Self::OnHold],
            Self::InProgress => &[
                Self::AwaitingApproval,
                Self::Completed,
                Self::Failed,
                Self::Escalated,
            ],
            Self::AwaitingApproval => &[Self::Completed, Self::Failed],
            Self::Failed => &[Self::InProgress],
            Self::OnHold => &[Self::Pending],
            Self::Completed | Self::Escalated => &[],
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Escalated)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::OnHold => "on_hold",
            Self::Escalated => "escalated",
        }
    }
}

impl std::fmt::Display for ActionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Case State ───────────────────────────────────────────────────────

/// State of a whole case
///
/// Cases move by directive, not by table: the orchestrator sets the state
/// a resolved directive calls for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    Draft,
    Pending,
    InProgress,
    AwaitingApproval,
    Completed,
    OnHold,
    Failed,
    Escalated,
}

impl CaseState {
    /// Closed cases accept no further step operations
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Escalated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Failed => "failed",
            Self::Escalated => "escalated",
        }
    }
}

impl std::fmt::Display for CaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
