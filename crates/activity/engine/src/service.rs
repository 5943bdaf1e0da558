//! Activity service: the inbound command interface
//!
//! The service loads a case, applies one command to its own copy and saves
//! the copy only if the whole command succeeded. It owns scenario lookup,
//! lifecycle dispatch and callback correlation; the case owns everything
//! about stages and directives.
//!
//! Callers must not run two commands for the same case concurrently. The
//! service takes `&mut self`, so sharing one across threads already forces
//! a lock around it.

use crate::{
    ActionLifecycleHandler, Case, CaseRepository, Clock, Command, CommandOutcome, IdGenerator,
    InMemoryCallbackLedger, InMemoryCaseRepository, LifecycleContext, LifecycleDispatcher,
    PendingCallbackLedger, ScenarioRegistry, StagedCallbacks, SystemClock, UuidIdGenerator,
};
use activity_types::*;
use std::sync::Arc;

/// Front door of the engine
pub struct ActivityService {
    scenarios: ScenarioRegistry,
    cases: Box<dyn CaseRepository>,
    callbacks: Box<dyn PendingCallbackLedger>,
    dispatcher: LifecycleDispatcher,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl ActivityService {
    /// In-memory stores, UUID ids and the system clock
    pub fn new() -> Self {
        Self {
            scenarios: ScenarioRegistry::new(),
            cases: Box::new(InMemoryCaseRepository::new()),
            callbacks: Box::new(InMemoryCallbackLedger::new()),
            dispatcher: LifecycleDispatcher::new(),
            ids: Arc::new(UuidIdGenerator),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_cases(mut self, cases: Box<dyn CaseRepository>) -> Self {
        self.cases = cases;
        self
    }

    pub fn with_callbacks(mut self, callbacks: Box<dyn PendingCallbackLedger>) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_handler(mut self, handler: Box<dyn ActionLifecycleHandler>) -> Self {
        self.dispatcher.register(handler);
        self
    }

    // ── Registration ─────────────────────────────────────────────────

    pub fn register_scenario(&mut self, scenario: ScenarioBlueprint) -> ActivityResult<ScenarioCode> {
        self.scenarios.register(scenario)
    }

    pub fn register_handler(&mut self, handler: Box<dyn ActionLifecycleHandler>) {
        self.dispatcher.register(handler);
    }

    pub fn scenarios(&self) -> &ScenarioRegistry {
        &self.scenarios
    }

    pub fn dispatcher(&self) -> &LifecycleDispatcher {
        &self.dispatcher
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// A copy of the stored case
    pub fn case(&self, id: &CaseId) -> ActivityResult<Case> {
        self.cases.get(id)
    }

    pub fn callbacks(&self) -> &dyn PendingCallbackLedger {
        self.callbacks.as_ref()
    }

    /// Unresolved callbacks past their deadline, for an external sweeper
    pub fn overdue_callbacks(&self) -> Vec<PendingCallback> {
        self.callbacks.find_overdue(self.clock.now())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one command
    pub fn handle(&mut self, command: Command) -> ActivityResult<CommandOutcome> {
        let name = command.name();
        let result = match command {
            Command::StartCase {
                case_id,
                client_ref,
                scenario_code,
            } => self.start_case(case_id, client_ref, &scenario_code),
            Command::StartStep {
                case_id,
                stage_code,
                step_code,
            } => self.start_step(&case_id, &stage_code, &step_code),
            Command::CompleteStep {
                case_id,
                stage_code,
                step_code,
                outcome_code,
                description,
                reason,
                approver,
            } => {
                let mut outcome = Outcome::new(outcome_code, description, self.clock.now());
                outcome.reason = reason;
                self.complete_step(&case_id, &stage_code, &step_code, outcome, approver)
            }
            Command::RecordExternalOutcome {
                external_reference,
                outcome_code,
                description,
                vendor,
                reason,
            } => {
                let mut outcome = Outcome::new(outcome_code, description, self.clock.now());
                outcome.reason = reason;
                self.record_external_outcome(&external_reference, &vendor, outcome)
            }
        };

        if let Err(err) = &result {
            tracing::warn!(command = name, error = %err, "Command rejected");
        }
        result
    }

    pub fn start_case(
        &mut self,
        case_id: CaseId,
        client_ref: impl Into<String>,
        scenario_code: &ScenarioCode,
    ) -> ActivityResult<CommandOutcome> {
        if self.cases.contains(&case_id) {
            return Err(ActivityError::DuplicateCase(case_id));
        }
        let scenario = self.scenarios.get(scenario_code)?;
        let case = Case::from_scenario(
            case_id,
            client_ref,
            scenario,
            self.ids.as_ref(),
            self.clock.now(),
        )?;

        tracing::info!(
            case_id = %case.id(),
            scenario = %scenario_code,
            stages = case.stages().len(),
            "Case started"
        );

        let outcome = CommandOutcome::new(case.id().clone(), case.state());
        self.cases.save(case)?;
        Ok(outcome)
    }

    /// Start a step and run its lifecycle handler
    ///
    /// A `Failed` handler result fails the step; the command itself still
    /// succeeds and reports the result. Callbacks the handler records reach
    /// the ledger only once the case is saved.
    pub fn start_step(
        &mut self,
        case_id: &CaseId,
        stage_code: &StageCode,
        step_code: &StepCode,
    ) -> ActivityResult<CommandOutcome> {
        let mut case = self.cases.get(case_id)?;
        let transition = case.start_step(stage_code, step_code)?;

        let (lifecycle, writes) = {
            let action = case.find_action(stage_code, step_code)?;
            let ctx = LifecycleContext {
                case_id,
                stage_code,
                action,
                from: transition.from,
                to: transition.to,
                now: self.clock.now(),
            };
            let mut staged = StagedCallbacks::new(self.callbacks.as_ref());
            let lifecycle = self.dispatcher.dispatch(&ctx, &mut staged)?;
            (lifecycle, staged.into_writes())
        };

        if let LifecycleResult::Failed { message } = &lifecycle {
            case.fail_step(stage_code, step_code, message)?;
        }

        let outcome = self.commit(case, Vec::new(), Some(lifecycle))?;
        writes.apply(self.callbacks.as_mut())?;
        Ok(outcome)
    }

    /// Complete the latest instance of a step by hand
    ///
    /// A vendor request still open for that instance is resolved, so a late
    /// delivery of its result fails closed.
    pub fn complete_step(
        &mut self,
        case_id: &CaseId,
        stage_code: &StageCode,
        step_code: &StepCode,
        mut outcome: Outcome,
        approver: Option<PartySignature>,
    ) -> ActivityResult<CommandOutcome> {
        let mut case = self.cases.get(case_id)?;
        if outcome.approver.is_none() {
            outcome.approver = approver.clone();
        }
        let completed = case
            .find_action(stage_code, step_code)
            .map(|action| action.id().clone())
            .ok();
        let directives = case.complete_step(stage_code, step_code, outcome, approver)?;
        let result = self.commit(case, directives, None)?;
        if let Some(action_id) = completed {
            self.retire_callback(&action_id, "completed by hand")?;
        }
        Ok(result)
    }

    /// Correlate a vendor result with its pending callback and complete the
    /// exact instance the callback was recorded for
    ///
    /// Fails closed with `NoPendingCallback` when the reference is unknown
    /// or already resolved, so a repeated delivery changes nothing. A
    /// callback whose instance has been superseded by a retry fails with
    /// `StaleCallback`.
    pub fn record_external_outcome(
        &mut self,
        external_reference: &str,
        vendor: &str,
        mut outcome: Outcome,
    ) -> ActivityResult<CommandOutcome> {
        let callback = self
            .callbacks
            .find_by_external_reference(external_reference)
            .ok_or_else(|| ActivityError::NoPendingCallback(external_reference.to_string()))?;
        if callback.vendor != vendor {
            return Err(ActivityError::VendorMismatch {
                expected: callback.vendor,
                actual: vendor.to_string(),
            });
        }

        let mut case = self.cases.get(&callback.case_id)?;
        let current = case.find_action(&callback.stage_code, &callback.step_code)?;
        if current.id() != &callback.action_id {
            return Err(ActivityError::StaleCallback {
                reference: external_reference.to_string(),
                action_id: callback.action_id,
            });
        }

        let approver = PartySignature::vendor(vendor, self.clock.now());
        outcome.approver = Some(approver.clone());
        let directives = case.complete_action(&callback.action_id, outcome, Some(approver))?;

        let result = self.commit(case, directives, None)?;
        self.callbacks.mark_resolved(&callback.action_id)?;
        tracing::info!(
            case_id = %callback.case_id,
            vendor = %vendor,
            reference = %external_reference,
            "External outcome recorded"
        );
        Ok(result)
    }

    /// Open a fresh instance of a settled step, as a `retry_step` directive asks
    ///
    /// A callback still open for the superseded instance is resolved.
    pub fn retry_step(
        &mut self,
        case_id: &CaseId,
        stage_code: &StageCode,
        step_code: &StepCode,
    ) -> ActivityResult<ActionId> {
        let mut case = self.cases.get(case_id)?;
        let previous = case.find_action(stage_code, step_code)?.id().clone();
        let action_id = case.retry_step(stage_code, step_code, self.ids.as_ref(), self.clock.now())?;
        self.cases.save(case)?;
        self.retire_callback(&previous, "superseded by retry")?;
        Ok(action_id)
    }

    /// Add a step instance to a stage, as a `spawn_step` directive asks
    pub fn spawn_step(
        &mut self,
        case_id: &CaseId,
        stage_code: &StageCode,
        step_code: &StepCode,
    ) -> ActivityResult<ActionId> {
        let mut case = self.cases.get(case_id)?;
        let previous = case
            .find_action(stage_code, step_code)
            .ok()
            .map(|action| action.id().clone());
        let action_id = case.spawn_step(stage_code, step_code, self.ids.as_ref(), self.clock.now())?;
        self.cases.save(case)?;
        if let Some(previous) = previous {
            self.retire_callback(&previous, "superseded by spawn")?;
        }
        Ok(action_id)
    }

    /// Resolve an action's callback if one is still open
    fn retire_callback(&mut self, action_id: &ActionId, why: &str) -> ActivityResult<()> {
        match self.callbacks.find_by_action_id(action_id) {
            Some(callback) if !callback.resolved => {
                self.callbacks.mark_resolved(action_id)?;
                tracing::info!(
                    action = %action_id,
                    vendor = %callback.vendor,
                    reference = %callback.external_reference,
                    reason = why,
                    "Pending callback retired"
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn commit(
        &mut self,
        mut case: Case,
        directives: Vec<OutcomeDirective>,
        lifecycle: Option<LifecycleResult>,
    ) -> ActivityResult<CommandOutcome> {
        let events = case.release_events();
        for event in &events {
            tracing::debug!(case_id = %case.id(), event = event.name(), "Event released");
        }

        let mut outcome = CommandOutcome::new(case.id().clone(), case.state())
            .with_directives(directives)
            .with_events(events);
        if let Some(lifecycle) = lifecycle {
            outcome = outcome.with_lifecycle(lifecycle);
        }

        self.cases.save(case)?;
        Ok(outcome)
    }
}

impl Default for ActivityService {
    fn default() -> Self {
        Self::new()
    }
}
