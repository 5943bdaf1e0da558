//! Case: a running scenario and its stage orchestration
//!
//! The case owns an ordered list of stages and a single current-stage
//! pointer. It completes steps through their actions, resolves the
//! resulting directives with the scenario's conflict policy and applies
//! them. Applying a completion is all-or-nothing: work happens on a copy
//! that replaces the case only when every directive applied cleanly.

use crate::{Action, IdGenerator, Stage};
use activity_types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The last transition `start_step` performed on an action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTransition {
    pub action_id: ActionId,
    pub from: ActionState,
    pub to: ActionState,
}

/// One running instance of a scenario
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    id: CaseId,
    client_ref: String,
    scenario: ScenarioBlueprint,
    stages: Vec<Stage>,
    current_stage: usize,
    state: CaseState,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<ActivityEvent>,
}

impl Case {
    /// Instantiate every stage and step of a scenario
    pub fn from_scenario(
        id: CaseId,
        client_ref: impl Into<String>,
        scenario: &ScenarioBlueprint,
        ids: &dyn IdGenerator,
        now: DateTime<Utc>,
    ) -> ActivityResult<Self> {
        scenario.validate()?;

        let stages = scenario
            .stages
            .iter()
            .map(|stage_bp| {
                let mut stage = Stage::from_blueprint(stage_bp);
                for step_bp in &stage_bp.steps {
                    let action_id = ids.action_id(&id, &step_bp.step_code);
                    stage.add_action(Action::from_blueprint(action_id, step_bp, now));
                }
                stage
            })
            .collect();

        Ok(Self {
            id,
            client_ref: client_ref.into(),
            scenario: scenario.clone(),
            stages,
            current_stage: 0,
            state: CaseState::Pending,
            created_at: now,
            events: Vec::new(),
        })
    }

    // ── Step Operations ──────────────────────────────────────────────

    /// Bring a step to InProgress and mark the case InProgress
    ///
    /// Draft steps go through Pending, on-hold steps are released back
    /// through Pending, failed steps resume directly.
    pub fn start_step(
        &mut self,
        stage_code: &StageCode,
        step_code: &StepCode,
    ) -> ActivityResult<StepTransition> {
        self.ensure_open()?;
        let action = self.action_mut(stage_code, step_code)?;

        let from = match action.state() {
            ActionState::Draft | ActionState::OnHold => {
                action.transition_to(ActionState::Pending)?;
                action.transition_to(ActionState::InProgress)?
            }
            _ => action.transition_to(ActionState::InProgress)?,
        };
        let transition = StepTransition {
            action_id: action.id().clone(),
            from,
            to: ActionState::InProgress,
        };

        self.state = CaseState::InProgress;
        tracing::debug!(
            case_id = %self.id,
            stage = %stage_code,
            step = %step_code,
            "Step started"
        );
        Ok(transition)
    }

    /// Complete the latest instance of a step and apply the directives its
    /// outcome resolves to
    ///
    /// Returns the resolved directives. On error the case is unchanged.
    pub fn complete_step(
        &mut self,
        stage_code: &StageCode,
        step_code: &StepCode,
        outcome: Outcome,
        approver: Option<PartySignature>,
    ) -> ActivityResult<Vec<OutcomeDirective>> {
        self.ensure_open()?;
        let action_id = self.find_action(stage_code, step_code)?.id().clone();
        self.complete_action(&action_id, outcome, approver)
    }

    /// Complete one step instance by id
    ///
    /// Same contract as [`Case::complete_step`], but targets exactly the
    /// instance a pending callback was recorded for.
    pub fn complete_action(
        &mut self,
        action_id: &ActionId,
        outcome: Outcome,
        approver: Option<PartySignature>,
    ) -> ActivityResult<Vec<OutcomeDirective>> {
        self.ensure_open()?;

        let mut next = self.clone();
        let resolved = next.apply_completion(action_id, outcome, approver)?;
        *self = next;

        tracing::info!(
            case_id = %self.id,
            action = %action_id,
            state = %self.state,
            directives = resolved.len(),
            "Step completed"
        );
        Ok(resolved)
    }

    fn apply_completion(
        &mut self,
        action_id: &ActionId,
        outcome: Outcome,
        approver: Option<PartySignature>,
    ) -> ActivityResult<Vec<OutcomeDirective>> {
        let stage_idx = self
            .stages
            .iter()
            .position(|stage| stage.find_action_by_id(action_id).is_some())
            .ok_or_else(|| ActivityError::ActionNotFound(action_id.clone()))?;
        let stage_code = self.stages[stage_idx].stage_code().clone();
        let at = outcome.recorded_at;

        let action = self.stages[stage_idx]
            .find_action_by_id_mut(action_id)
            .ok_or_else(|| ActivityError::ActionNotFound(action_id.clone()))?;
        let step_code = action.action_type().clone();
        if let Some(approver) = approver {
            action.add_approver(approver);
        }
        let directives = action.complete(vec![outcome])?;
        let resolved = directives.resolve(&self.scenario.conflict_policy);
        if directives.has_conflict() {
            tracing::debug!(
                case_id = %self.id,
                policy = self.scenario.conflict_policy.name(),
                produced = directives.len(),
                applied = resolved.len(),
                "Directive conflict resolved"
            );
        }

        self.events.push(ActivityEvent::StepCompleted {
            case_id: self.id.clone(),
            stage_code,
            step_code: step_code.clone(),
            occurred_at: at,
        });

        for directive in &resolved {
            self.events.push(ActivityEvent::OutcomeDirectiveDispatched {
                case_id: self.id.clone(),
                step_code: step_code.clone(),
                directive: directive.clone(),
                occurred_at: at,
            });
            self.apply_directive(directive, stage_idx, at)?;
        }

        Ok(resolved)
    }

    fn apply_directive(
        &mut self,
        directive: &OutcomeDirective,
        stage_idx: usize,
        at: DateTime<Utc>,
    ) -> ActivityResult<()> {
        match directive {
            OutcomeDirective::AdvanceStage => self.advance_stage(stage_idx, at)?,
            OutcomeDirective::CompleteProcess => self.close_completed(at),
            OutcomeDirective::FailProcess { reason } => {
                tracing::warn!(case_id = %self.id, reason = %reason, "Case failed");
                self.state = CaseState::Failed;
            }
            OutcomeDirective::Escalate => {
                tracing::warn!(case_id = %self.id, "Case escalated");
                self.state = CaseState::Escalated;
            }
            OutcomeDirective::Hold { reason } => {
                tracing::info!(case_id = %self.id, reason = %reason, "Case on hold");
                self.state = CaseState::OnHold;
            }
            OutcomeDirective::RetryStep { .. } | OutcomeDirective::SpawnStep { .. } => {
                tracing::debug!(
                    case_id = %self.id,
                    directive = %directive,
                    "Directive left to caller"
                );
            }
        }
        Ok(())
    }

    /// Mark a stage completed and move the pointer past it
    fn advance_stage(&mut self, stage_idx: usize, at: DateTime<Utc>) -> ActivityResult<()> {
        let stage = &self.stages[stage_idx];
        if let Some(unsettled) = stage.unsettled_action() {
            return Err(ActivityError::StageNotSettled {
                stage: stage.stage_code().clone(),
                step: unsettled.action_type().clone(),
            });
        }
        self.stages[stage_idx].mark_completed();

        if stage_idx != self.current_stage {
            return Ok(());
        }

        let next = (stage_idx + 1..self.stages.len()).find(|&i| !self.stages[i].is_completed());
        match next {
            Some(next_idx) => {
                let from = self.stages[stage_idx].stage_code().clone();
                let to = self.stages[next_idx].stage_code().clone();
                self.current_stage = next_idx;
                tracing::info!(case_id = %self.id, from = %from, to = %to, "Stage advanced");
                self.events.push(ActivityEvent::StageAdvanced {
                    case_id: self.id.clone(),
                    from,
                    to,
                    occurred_at: at,
                });
            }
            None => self.close_completed(at),
        }
        Ok(())
    }

    fn close_completed(&mut self, at: DateTime<Utc>) {
        self.state = CaseState::Completed;
        tracing::info!(case_id = %self.id, "Process completed");
        self.events.push(ActivityEvent::ProcessCompleted {
            case_id: self.id.clone(),
            occurred_at: at,
        });
    }

    /// Record that a step's side effect failed (InProgress to Failed)
    pub fn fail_step(
        &mut self,
        stage_code: &StageCode,
        step_code: &StepCode,
        reason: &str,
    ) -> ActivityResult<()> {
        self.ensure_open()?;
        let case_id = self.id.clone();
        let action = self.action_mut(stage_code, step_code)?;
        action.transition_to(ActionState::Failed)?;
        tracing::warn!(
            case_id = %case_id,
            step = %step_code,
            reason = %reason,
            "Step failed"
        );
        Ok(())
    }

    /// Re-drive a step after a retry directive
    ///
    /// Adds a fresh Draft instance next to the settled one. Only terminal
    /// or failed steps can be retried.
    pub fn retry_step(
        &mut self,
        stage_code: &StageCode,
        step_code: &StepCode,
        ids: &dyn IdGenerator,
        now: DateTime<Utc>,
    ) -> ActivityResult<ActionId> {
        self.ensure_open()?;
        let case_id = self.id.clone();
        let stage_idx = self.stage_index(stage_code)?;
        let previous = self.action_mut(stage_code, step_code)?;
        if !previous.is_terminal() && previous.state() != ActionState::Failed {
            return Err(ActivityError::InvalidStateTransition {
                from: previous.state(),
                to: ActionState::Draft,
            });
        }
        let retry = previous.reopen(ids.action_id(&case_id, step_code), now);
        let retry_id = retry.id().clone();
        self.stages[stage_idx].add_action(retry);

        tracing::info!(case_id = %case_id, step = %step_code, action = %retry_id, "Step retried");
        Ok(retry_id)
    }

    /// Add a new instance of a scenario step to a stage
    pub fn spawn_step(
        &mut self,
        stage_code: &StageCode,
        step_code: &StepCode,
        ids: &dyn IdGenerator,
        now: DateTime<Utc>,
    ) -> ActivityResult<ActionId> {
        self.ensure_open()?;
        let stage_idx = self.stage_index(stage_code)?;
        let (_, blueprint) =
            self.scenario
                .find_step(step_code)
                .ok_or_else(|| ActivityError::StepNotFound {
                    stage: stage_code.clone(),
                    step: step_code.clone(),
                })?;
        let action = Action::from_blueprint(ids.action_id(&self.id, step_code), blueprint, now);
        let action_id = action.id().clone();
        self.stages[stage_idx].add_action(action);

        tracing::info!(
            case_id = %self.id,
            stage = %stage_code,
            step = %step_code,
            action = %action_id,
            "Step spawned"
        );
        Ok(action_id)
    }

    /// Drain buffered events
    pub fn release_events(&mut self) -> Vec<ActivityEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Lookups ──────────────────────────────────────────────────────

    fn ensure_open(&self) -> ActivityResult<()> {
        if self.state.is_closed() {
            tracing::warn!(case_id = %self.id, state = %self.state, "Operation on closed case");
            return Err(ActivityError::CaseClosed {
                case_id: self.id.clone(),
                state: self.state,
            });
        }
        Ok(())
    }

    fn stage_index(&self, stage_code: &StageCode) -> ActivityResult<usize> {
        self.stages
            .iter()
            .position(|s| s.stage_code() == stage_code)
            .ok_or_else(|| ActivityError::StageNotFound(stage_code.clone()))
    }

    fn action_mut(
        &mut self,
        stage_code: &StageCode,
        step_code: &StepCode,
    ) -> ActivityResult<&mut Action> {
        let idx = self.stage_index(stage_code)?;
        self.stages[idx]
            .find_action_mut(step_code)
            .ok_or_else(|| ActivityError::StepNotFound {
                stage: stage_code.clone(),
                step: step_code.clone(),
            })
    }

    pub fn stage(&self, stage_code: &StageCode) -> ActivityResult<&Stage> {
        let idx = self.stage_index(stage_code)?;
        Ok(&self.stages[idx])
    }

    /// Latest instance of a step
    pub fn find_action(&self, stage_code: &StageCode, step_code: &StepCode) -> ActivityResult<&Action> {
        self.stage(stage_code)?
            .find_action(step_code)
            .ok_or_else(|| ActivityError::StepNotFound {
                stage: stage_code.clone(),
                step: step_code.clone(),
            })
    }

    pub fn find_action_by_id(&self, id: &ActionId) -> Option<(&Stage, &Action)> {
        self.stages
            .iter()
            .find_map(|stage| stage.find_action_by_id(id).map(|action| (stage, action)))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> &CaseId {
        &self.id
    }

    pub fn client_ref(&self) -> &str {
        &self.client_ref
    }

    pub fn scenario(&self) -> &ScenarioBlueprint {
        &self.scenario
    }

    pub fn state(&self) -> CaseState {
        self.state
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn current_stage(&self) -> Option<&Stage> {
        self.stages.get(self.current_stage)
    }

    pub fn is_complete(&self) -> bool {
        self.state == CaseState::Completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Events not yet released
    pub fn pending_events(&self) -> &[ActivityEvent] {
        &self.events
    }
}
