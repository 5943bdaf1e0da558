//! Lifecycle dispatcher: the external side-effect boundary
//!
//! When a step moves from Pending to InProgress, the first registered
//! handler that supports the step gets to act on it: finish a side effect
//! synchronously, start an external verification and store a pending
//! callback, or report failure. The dispatcher never retries and never
//! chains past the first match.

use crate::{Action, PendingCallbackLedger};
use activity_types::*;
use chrono::{DateTime, Duration, Utc};

/// What a handler sees of the transition it is asked to handle
#[derive(Clone, Copy, Debug)]
pub struct LifecycleContext<'a> {
    pub case_id: &'a CaseId,
    pub stage_code: &'a StageCode,
    pub action: &'a Action,
    pub from: ActionState,
    pub to: ActionState,
    pub now: DateTime<Utc>,
}

impl<'a> LifecycleContext<'a> {
    pub fn step_code(&self) -> &'a StepCode {
        self.action.action_type()
    }

    /// A pending callback for this action, due `wait` from now
    pub fn pending_callback(
        &self,
        external_reference: impl Into<String>,
        vendor: impl Into<String>,
        wait: Duration,
    ) -> PendingCallback {
        PendingCallback::new(
            self.action.id().clone(),
            self.case_id.clone(),
            self.stage_code.clone(),
            self.step_code().clone(),
            external_reference,
            vendor,
            self.now + wait,
            self.now,
        )
    }
}

/// A side effect bound to step transitions
pub trait ActionLifecycleHandler: Send + Sync {
    fn name(&self) -> &str;

    fn supports(&self, action_type: &StepCode, from: ActionState, to: ActionState) -> bool;

    /// Act on the transition
    ///
    /// Vendor-level failures come back as [`LifecycleResult::Failed`]; an
    /// `Err` means the handler could not run at all (e.g. the ledger
    /// refused the callback).
    fn handle(
        &self,
        ctx: &LifecycleContext<'_>,
        callbacks: &mut dyn PendingCallbackLedger,
    ) -> ActivityResult<LifecycleResult>;
}

/// Ordered handler registry, first match wins
#[derive(Default)]
pub struct LifecycleDispatcher {
    handlers: Vec<Box<dyn ActionLifecycleHandler>>,
}

impl LifecycleDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler after all existing ones
    pub fn register(&mut self, handler: Box<dyn ActionLifecycleHandler>) {
        tracing::debug!(
            handler = handler.name(),
            position = self.handlers.len(),
            "Lifecycle handler registered"
        );
        self.handlers.push(handler);
    }

    pub fn with_handler(mut self, handler: Box<dyn ActionLifecycleHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn count(&self) -> usize {
        self.handlers.len()
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Run the first supporting handler, or report a no-op completion
    pub fn dispatch(
        &self,
        ctx: &LifecycleContext<'_>,
        callbacks: &mut dyn PendingCallbackLedger,
    ) -> ActivityResult<LifecycleResult> {
        let step_code = ctx.step_code();
        let Some(handler) = self
            .handlers
            .iter()
            .find(|h| h.supports(step_code, ctx.from, ctx.to))
        else {
            tracing::trace!(step = %step_code, "No lifecycle handler, completing");
            return Ok(LifecycleResult::completed("no lifecycle handler"));
        };

        let result = handler.handle(ctx, callbacks)?;
        match &result {
            LifecycleResult::Completed { message, .. } => tracing::debug!(
                handler = handler.name(),
                case_id = %ctx.case_id,
                step = %step_code,
                message = %message,
                "Lifecycle side effect completed"
            ),
            LifecycleResult::AwaitingCallback { external_reference } => tracing::info!(
                handler = handler.name(),
                case_id = %ctx.case_id,
                step = %step_code,
                reference = %external_reference,
                "Awaiting external callback"
            ),
            LifecycleResult::Failed { message } => tracing::warn!(
                handler = handler.name(),
                case_id = %ctx.case_id,
                step = %step_code,
                message = %message,
                "Lifecycle handler failed"
            ),
        }
        Ok(result)
    }
}

impl std::fmt::Debug for LifecycleDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleDispatcher")
            .field("handlers", &self.handler_names())
            .finish()
    }
}
