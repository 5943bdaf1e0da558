//! Incentive action: one member activity moving towards settlement
//!
//! Unlike a blueprint step, an incentive has no outcome map driving a
//! process. Its outcome *is* the business effect: settling books journal
//! entries and reward grants, reversing books the opposite entries.

use crate::{
    ActivityCategory, IncentiveDecision, IncentiveError, IncentiveResult, IncentiveState,
    JournalEntry, RewardGrant,
};
use activity_engine::IdGenerator;
use activity_types::{LifecycleState, Outcome, PartySignature};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncentiveAction {
    id: String,
    member_id: String,
    category: ActivityCategory,
    state: IncentiveState,
    evaluator: Option<PartySignature>,
    decision: Option<IncentiveDecision>,
    journal_entries: Vec<JournalEntry>,
    reward_grants: Vec<RewardGrant>,
    outcomes: Vec<Outcome>,
    created_at: DateTime<Utc>,
}

impl IncentiveAction {
    pub fn new(
        ids: &dyn IdGenerator,
        member_id: impl Into<String>,
        category: ActivityCategory,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ids.next_id("loy"),
            member_id: member_id.into(),
            category,
            state: IncentiveState::Received,
            evaluator: None,
            decision: None,
            journal_entries: Vec::new(),
            reward_grants: Vec::new(),
            outcomes: Vec::new(),
            created_at: now,
        }
    }

    fn ensure(&self, target: IncentiveState) -> IncentiveResult<()> {
        if self.state.can_transition_to(target) {
            Ok(())
        } else {
            Err(IncentiveError::InvalidStateTransition {
                from: self.state,
                to: target,
            })
        }
    }

    fn transition_to(&mut self, target: IncentiveState) -> IncentiveResult<()> {
        self.ensure(target)?;
        tracing::debug!(incentive = %self.id, from = %self.state, to = %target, "Incentive transition");
        self.state = target;
        Ok(())
    }

    /// Received to Evaluating
    pub fn evaluate(&mut self, evaluator: PartySignature) -> IncentiveResult<()> {
        self.transition_to(IncentiveState::Evaluating)?;
        self.evaluator = Some(evaluator);
        Ok(())
    }

    /// Evaluating to AwaitingSettlement
    pub fn approve(&mut self, at: DateTime<Utc>) -> IncentiveResult<()> {
        self.transition_to(IncentiveState::AwaitingSettlement)?;
        self.outcomes
            .push(Outcome::new("approved", "Approved for settlement", at));
        Ok(())
    }

    fn check_decision(&self, decision: &IncentiveDecision) -> IncentiveResult<()> {
        if decision.is_empty() {
            return Err(IncentiveError::EmptyDecision);
        }
        let stranger = decision
            .journal_entries
            .iter()
            .map(|e| e.account_id.as_str())
            .chain(decision.reward_grants.iter().map(|g| g.member_id.as_str()))
            .find(|id| *id != self.member_id);
        match stranger {
            Some(actual) => Err(IncentiveError::MemberMismatch {
                expected: self.member_id.clone(),
                actual: actual.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Evaluating to AwaitingSettlement, holding the decision to settle with
    ///
    /// Nothing is booked until [`IncentiveAction::settle_approved`].
    pub fn approve_with(&mut self, decision: IncentiveDecision, at: DateTime<Utc>) -> IncentiveResult<()> {
        self.check_decision(&decision)?;
        self.approve(at)?;
        self.decision = Some(decision);
        Ok(())
    }

    /// Settle with the decision held since approval
    pub fn settle_approved(&mut self, at: DateTime<Utc>) -> IncentiveResult<()> {
        let decision = self
            .decision
            .clone()
            .ok_or_else(|| IncentiveError::NoApprovedDecision(self.id.clone()))?;
        self.settle(decision, at)
    }

    /// Settle with a decision and book its effects
    ///
    /// An incentive still under evaluation is approved first. The decision
    /// must credit this incentive's member and carry at least one effect.
    pub fn settle(&mut self, decision: IncentiveDecision, at: DateTime<Utc>) -> IncentiveResult<()> {
        self.check_decision(&decision)?;

        if self.state == IncentiveState::Evaluating {
            self.approve(at)?;
        }
        self.transition_to(IncentiveState::Settled)?;

        self.outcomes.push(Outcome::new(
            decision.outcome_code(),
            decision.description.clone(),
            at,
        ));
        self.journal_entries
            .extend(decision.journal_entries.iter().cloned());
        self.reward_grants.extend(decision.reward_grants.iter().cloned());

        tracing::info!(
            incentive = %self.id,
            member = %self.member_id,
            points = decision.total_points(),
            rewards = decision.reward_grants.len(),
            "Incentive settled"
        );
        self.decision = Some(decision);
        Ok(())
    }

    /// Evaluating to Rejected
    pub fn reject(&mut self, reason: &str, at: DateTime<Utc>) -> IncentiveResult<()> {
        self.transition_to(IncentiveState::Rejected)?;
        self.outcomes
            .push(Outcome::new("rejected", "Incentive rejected", at).with_reason(reason));
        tracing::info!(incentive = %self.id, reason = %reason, "Incentive rejected");
        Ok(())
    }

    /// Settled to Reversed, cancelling every credit booked at settlement
    pub fn reverse(&mut self, reason: &str, at: DateTime<Utc>) -> IncentiveResult<()> {
        self.transition_to(IncentiveState::Reversed)?;
        let reversals: Vec<JournalEntry> = self
            .journal_entries
            .iter()
            .filter(|e| e.is_credit())
            .map(|e| e.reversal(reason))
            .collect();
        self.journal_entries.extend(reversals);
        self.outcomes
            .push(Outcome::new("reversed", "Incentive reversed", at).with_reason(reason));
        tracing::warn!(incentive = %self.id, reason = %reason, "Incentive reversed");
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    pub fn category(&self) -> ActivityCategory {
        self.category
    }

    pub fn state(&self) -> IncentiveState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn evaluator(&self) -> Option<&PartySignature> {
        self.evaluator.as_ref()
    }

    pub fn decision(&self) -> Option<&IncentiveDecision> {
        self.decision.as_ref()
    }

    pub fn journal_entries(&self) -> &[JournalEntry] {
        &self.journal_entries
    }

    pub fn reward_grants(&self) -> &[RewardGrant] {
        &self.reward_grants
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn has_outcome(&self, code: &str) -> bool {
        self.outcomes.iter().any(|o| o.code == code)
    }

    /// Net points booked so far
    pub fn total_points(&self) -> i64 {
        self.journal_entries.iter().map(|e| e.points).sum()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
