//! Outcome directives: how the enclosing process should proceed
//!
//! Each declared outcome of a step maps to exactly one directive. A single
//! completion can still yield several (batched outcomes), which is why
//! directives travel as an [`OutcomeDirectiveSet`] until a conflict policy
//! resolves them.

use crate::{DirectiveConflictPolicy, StageCode, StepCode};
use serde::{Deserialize, Serialize};

// ── Directive Vocabulary ─────────────────────────────────────────────

/// The kind of a directive, without its parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeDirectiveType {
    AdvanceStage,
    RetryStep,
    SpawnStep,
    CompleteProcess,
    FailProcess,
    Escalate,
    Hold,
}

impl OutcomeDirectiveType {
    pub const ALL: [Self; 7] = [
        Self::AdvanceStage,
        Self::RetryStep,
        Self::SpawnStep,
        Self::CompleteProcess,
        Self::FailProcess,
        Self::Escalate,
        Self::Hold,
    ];

    /// Urgency of the directive. Lower is more urgent.
    pub const fn priority(&self) -> u8 {
        match self {
            Self::FailProcess => 1,
            Self::Escalate => 2,
            Self::Hold => 3,
            Self::RetryStep => 4,
            Self::AdvanceStage => 5,
            Self::SpawnStep => 6,
            Self::CompleteProcess => 7,
        }
    }

    /// Terminal directives stop the process from moving forward
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::FailProcess | Self::Escalate | Self::Hold)
    }

    /// Composable directives can be applied alongside any other
    pub const fn is_composable(&self) -> bool {
        matches!(self, Self::SpawnStep)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdvanceStage => "advance_stage",
            Self::RetryStep => "retry_step",
            Self::SpawnStep => "spawn_step",
            Self::CompleteProcess => "complete_process",
            Self::FailProcess => "fail_process",
            Self::Escalate => "escalate",
            Self::Hold => "hold",
        }
    }
}

impl std::fmt::Display for OutcomeDirectiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Directive ────────────────────────────────────────────────────────

/// A directive together with the parameters its type requires
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutcomeDirective {
    AdvanceStage,
    RetryStep {
        step_code: StepCode,
    },
    SpawnStep {
        step_code: StepCode,
        stage_code: StageCode,
    },
    CompleteProcess,
    FailProcess {
        reason: String,
    },
    Escalate,
    Hold {
        reason: String,
    },
}

impl OutcomeDirective {
    pub fn advance_stage() -> Self {
        Self::AdvanceStage
    }

    pub fn retry_step(step_code: impl Into<String>) -> Self {
        Self::RetryStep {
            step_code: StepCode::new(step_code),
        }
    }

    pub fn spawn_step(step_code: impl Into<String>, stage_code: impl Into<String>) -> Self {
        Self::SpawnStep {
            step_code: StepCode::new(step_code),
            stage_code: StageCode::new(stage_code),
        }
    }

    pub fn complete_process() -> Self {
        Self::CompleteProcess
    }

    pub fn fail_process(reason: impl Into<String>) -> Self {
        Self::FailProcess {
            reason: reason.into(),
        }
    }

    pub fn escalate() -> Self {
        Self::Escalate
    }

    pub fn hold(reason: impl Into<String>) -> Self {
        Self::Hold {
            reason: reason.into(),
        }
    }

    pub fn directive_type(&self) -> OutcomeDirectiveType {
        match self {
            Self::AdvanceStage => OutcomeDirectiveType::AdvanceStage,
            Self::RetryStep { .. } => OutcomeDirectiveType::RetryStep,
            Self::SpawnStep { .. } => OutcomeDirectiveType::SpawnStep,
            Self::CompleteProcess => OutcomeDirectiveType::CompleteProcess,
            Self::FailProcess { .. } => OutcomeDirectiveType::FailProcess,
            Self::Escalate => OutcomeDirectiveType::Escalate,
            Self::Hold { .. } => OutcomeDirectiveType::Hold,
        }
    }

    pub fn priority(&self) -> u8 {
        self.directive_type().priority()
    }

    pub fn is_terminal(&self) -> bool {
        self.directive_type().is_terminal()
    }

    pub fn is_composable(&self) -> bool {
        self.directive_type().is_composable()
    }
}

impl std::fmt::Display for OutcomeDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RetryStep { step_code } => write!(f, "retry_step({step_code})"),
            Self::SpawnStep {
                step_code,
                stage_code,
            } => write!(f, "spawn_step({step_code}, {stage_code})"),
            Self::FailProcess { reason } => write!(f, "fail_process({reason})"),
            Self::Hold { reason } => write!(f, "hold({reason})"),
            other => f.write_str(other.directive_type().as_str()),
        }
    }
}

// ── Directive Set ────────────────────────────────────────────────────

/// The unresolved directives produced by one step completion
///
/// The set holds no resolution logic of its own; [`resolve`](Self::resolve)
/// hands everything to the policy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeDirectiveSet {
    directives: Vec<OutcomeDirective>,
}

impl OutcomeDirectiveSet {
    pub fn new(directives: Vec<OutcomeDirective>) -> Self {
        Self { directives }
    }

    pub fn directives(&self) -> &[OutcomeDirective] {
        &self.directives
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn has_conflict(&self) -> bool {
        self.directives.iter().filter(|d| !d.is_composable()).count() > 1
    }

    /// Resolve the set into the directives actually applied
    pub fn resolve(&self, policy: &dyn DirectiveConflictPolicy) -> Vec<OutcomeDirective> {
        policy.resolve(&self.directives)
    }
}

impl From<Vec<OutcomeDirective>> for OutcomeDirectiveSet {
    fn from(directives: Vec<OutcomeDirective>) -> Self {
        Self::new(directives)
    }
}

impl IntoIterator for OutcomeDirectiveSet {
    type Item = OutcomeDirective;
    type IntoIter = std::vec::IntoIter<OutcomeDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.into_iter()
    }
}
