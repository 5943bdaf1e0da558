//! Action: one step instance and its state machine
//!
//! An action knows its blueprint, so it can refuse outcomes the step never
//! declared and look up the directive each recorded outcome produces. It
//! never applies a directive itself; that is the case's job.

use activity_types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A running instance of a step blueprint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    id: ActionId,
    blueprint: StepBlueprint,
    state: ActionState,
    actual_outcomes: Vec<Outcome>,
    initiator: Option<PartySignature>,
    approvers: Vec<PartySignature>,
    created_at: DateTime<Utc>,
}

impl Action {
    /// Create a Draft action from a step blueprint
    pub fn from_blueprint(id: ActionId, blueprint: &StepBlueprint, now: DateTime<Utc>) -> Self {
        Self {
            id,
            blueprint: blueprint.clone(),
            state: ActionState::Draft,
            actual_outcomes: Vec::new(),
            initiator: None,
            approvers: Vec::new(),
            created_at: now,
        }
    }

    /// A fresh Draft instance of the same step
    pub fn reopen(&self, id: ActionId, now: DateTime<Utc>) -> Self {
        Self::from_blueprint(id, &self.blueprint, now)
    }

    // ── State Machine ────────────────────────────────────────────────

    /// Move to `target`, returning the previous state
    pub fn transition_to(&mut self, target: ActionState) -> ActivityResult<ActionState> {
        if !self.state.can_transition_to(target) {
            return Err(ActivityError::InvalidStateTransition {
                from: self.state,
                to: target,
            });
        }
        let previous = self.state;
        self.state = target;
        tracing::trace!(
            action = %self.id,
            from = %previous,
            to = %target,
            "Action transitioned"
        );
        Ok(previous)
    }

    /// Append an outcome without changing state
    pub fn record_outcome(&mut self, outcome: Outcome) -> ActivityResult<()> {
        self.ensure_declared(&outcome)?;
        self.actual_outcomes.push(outcome);
        Ok(())
    }

    /// Record the outcomes, move to Completed and return their directives
    ///
    /// Directives come back unresolved, in the order the outcomes were
    /// passed. The call is checked up front: on error nothing is recorded
    /// and the state is unchanged.
    pub fn complete(&mut self, outcomes: Vec<Outcome>) -> ActivityResult<OutcomeDirectiveSet> {
        for outcome in &outcomes {
            self.ensure_declared(outcome)?;
        }
        if !self.state.can_transition_to(ActionState::Completed) {
            return Err(ActivityError::InvalidStateTransition {
                from: self.state,
                to: ActionState::Completed,
            });
        }

        let mut directives = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            if let Some(directive) = self.blueprint.directive_for(&outcome.code) {
                directives.push(directive.clone());
            }
            self.actual_outcomes.push(outcome);
        }
        self.transition_to(ActionState::Completed)?;

        Ok(OutcomeDirectiveSet::new(directives))
    }

    fn ensure_declared(&self, outcome: &Outcome) -> ActivityResult<()> {
        if self.blueprint.declares(&outcome.code) {
            Ok(())
        } else {
            Err(ActivityError::UnknownOutcomeCode {
                step: self.blueprint.step_code.clone(),
                code: outcome.code.clone(),
            })
        }
    }

    // ── Parties ──────────────────────────────────────────────────────

    pub fn set_initiator(&mut self, initiator: PartySignature) {
        self.initiator = Some(initiator);
    }

    pub fn add_approver(&mut self, approver: PartySignature) {
        self.approvers.push(approver);
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    /// The step this action instantiates
    pub fn action_type(&self) -> &StepCode {
        &self.blueprint.step_code
    }

    pub fn blueprint(&self) -> &StepBlueprint {
        &self.blueprint
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn actual_outcomes(&self) -> &[Outcome] {
        &self.actual_outcomes
    }

    pub fn initiator(&self) -> Option<&PartySignature> {
        self.initiator.as_ref()
    }

    pub fn approvers(&self) -> &[PartySignature] {
        &self.approvers
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
