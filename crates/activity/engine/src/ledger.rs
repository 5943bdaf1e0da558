//! Pending-callback ledger
//!
//! Tracks in-flight external correlations. Lookups by external reference
//! only see unresolved callbacks, which is what makes a second delivery of
//! the same vendor result fail closed.

use activity_types::{ActionId, ActivityError, ActivityResult, PendingCallback};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Storage for pending callbacks
pub trait PendingCallbackLedger: Send + Sync {
    /// Store a callback, replacing any earlier one for the same action
    fn store(&mut self, callback: PendingCallback) -> ActivityResult<()>;

    fn find_by_action_id(&self, action_id: &ActionId) -> Option<PendingCallback>;

    /// Unresolved callback with this vendor correlation id
    fn find_by_external_reference(&self, external_reference: &str) -> Option<PendingCallback>;

    fn mark_resolved(&mut self, action_id: &ActionId) -> ActivityResult<()>;

    /// Unresolved callbacks past their deadline
    fn find_overdue(&self, now: DateTime<Utc>) -> Vec<PendingCallback>;
}

/// In-memory ledger keyed by action id
#[derive(Clone, Debug, Default)]
pub struct InMemoryCallbackLedger {
    callbacks: HashMap<ActionId, PendingCallback>,
}

impl InMemoryCallbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn unresolved_count(&self) -> usize {
        self.callbacks.values().filter(|cb| !cb.resolved).count()
    }
}

impl PendingCallbackLedger for InMemoryCallbackLedger {
    fn store(&mut self, callback: PendingCallback) -> ActivityResult<()> {
        tracing::debug!(
            action = %callback.action_id,
            vendor = %callback.vendor,
            reference = %callback.external_reference,
            expected_by = %callback.expected_callback_by,
            "Pending callback stored"
        );
        self.callbacks.insert(callback.action_id.clone(), callback);
        Ok(())
    }

    fn find_by_action_id(&self, action_id: &ActionId) -> Option<PendingCallback> {
        self.callbacks.get(action_id).cloned()
    }

    fn find_by_external_reference(&self, external_reference: &str) -> Option<PendingCallback> {
        self.callbacks
            .values()
            .find(|cb| !cb.resolved && cb.external_reference == external_reference)
            .cloned()
    }

    fn mark_resolved(&mut self, action_id: &ActionId) -> ActivityResult<()> {
        let callback = self
            .callbacks
            .get_mut(action_id)
            .ok_or_else(|| ActivityError::NoPendingCallback(action_id.to_string()))?;
        callback.mark_resolved();
        tracing::debug!(action = %action_id, "Pending callback resolved");
        Ok(())
    }

    fn find_overdue(&self, now: DateTime<Utc>) -> Vec<PendingCallback> {
        let mut overdue: Vec<_> = self
            .callbacks
            .values()
            .filter(|cb| !cb.resolved && cb.is_overdue(now))
            .cloned()
            .collect();
        overdue.sort_by_key(|cb| cb.expected_callback_by);
        overdue
    }
}

// ── Staged Writes ────────────────────────────────────────────────────

/// Ledger view that holds writes back until they are committed
///
/// Reads see the underlying ledger with the staged writes laid over it.
/// Nothing reaches the underlying ledger until [`CallbackWrites::apply`].
pub struct StagedCallbacks<'a> {
    ledger: &'a dyn PendingCallbackLedger,
    writes: CallbackWrites,
}

/// Callback writes captured by [`StagedCallbacks`]
#[derive(Clone, Debug, Default)]
pub struct CallbackWrites {
    stored: Vec<PendingCallback>,
    resolved: Vec<ActionId>,
}

impl<'a> StagedCallbacks<'a> {
    pub fn new(ledger: &'a dyn PendingCallbackLedger) -> Self {
        Self {
            ledger,
            writes: CallbackWrites::default(),
        }
    }

    pub fn into_writes(self) -> CallbackWrites {
        self.writes
    }

    fn overlay(&self, callback: PendingCallback) -> PendingCallback {
        let mut callback = self
            .writes
            .stored
            .iter()
            .find(|cb| cb.action_id == callback.action_id)
            .cloned()
            .unwrap_or(callback);
        if self.writes.resolved.contains(&callback.action_id) {
            callback.mark_resolved();
        }
        callback
    }
}

impl PendingCallbackLedger for StagedCallbacks<'_> {
    fn store(&mut self, callback: PendingCallback) -> ActivityResult<()> {
        self.writes
            .stored
            .retain(|cb| cb.action_id != callback.action_id);
        self.writes.resolved.retain(|id| id != &callback.action_id);
        self.writes.stored.push(callback);
        Ok(())
    }

    fn find_by_action_id(&self, action_id: &ActionId) -> Option<PendingCallback> {
        self.writes
            .stored
            .iter()
            .find(|cb| &cb.action_id == action_id)
            .cloned()
            .or_else(|| self.ledger.find_by_action_id(action_id))
            .map(|cb| self.overlay(cb))
    }

    fn find_by_external_reference(&self, external_reference: &str) -> Option<PendingCallback> {
        self.writes
            .stored
            .iter()
            .find(|cb| cb.external_reference == external_reference)
            .cloned()
            .or_else(|| self.ledger.find_by_external_reference(external_reference))
            .map(|cb| self.overlay(cb))
            .filter(|cb| !cb.resolved)
    }

    fn mark_resolved(&mut self, action_id: &ActionId) -> ActivityResult<()> {
        if self.find_by_action_id(action_id).is_none() {
            return Err(ActivityError::NoPendingCallback(action_id.to_string()));
        }
        if !self.writes.resolved.contains(action_id) {
            self.writes.resolved.push(action_id.clone());
        }
        Ok(())
    }

    fn find_overdue(&self, now: DateTime<Utc>) -> Vec<PendingCallback> {
        let mut overdue: Vec<_> = self
            .ledger
            .find_overdue(now)
            .into_iter()
            .filter(|cb| !self.writes.stored.iter().any(|s| s.action_id == cb.action_id))
            .chain(self.writes.stored.iter().cloned())
            .map(|cb| self.overlay(cb))
            .filter(|cb| !cb.resolved && cb.is_overdue(now))
            .collect();
        overdue.sort_by_key(|cb| cb.expected_callback_by);
        overdue
    }
}

impl CallbackWrites {
    pub fn is_empty(&self) -> bool {
        self.stored.is_empty() && self.resolved.is_empty()
    }

    /// Write everything through to a ledger, stores first
    pub fn apply(self, ledger: &mut dyn PendingCallbackLedger) -> ActivityResult<()> {
        for callback in self.stored {
            ledger.store(callback)?;
        }
        for action_id in &self.resolved {
            ledger.mark_resolved(action_id)?;
        }
        Ok(())
    }
}
