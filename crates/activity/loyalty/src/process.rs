//! Loyalty process manager
//!
//! Loyalty is event driven: every recorded activity is its own incentive,
//! evaluated and settled independently of the others. The manager holds
//! the points rules, guards recording on the campaign, and buffers the
//! business events settlement and reversal produce.

use crate::{
    ActivityCategory, DoublePointsRule, IncentiveAction, IncentiveDecision, IncentiveError,
    IncentiveResult, LoyaltyCampaign, LoyaltyEvent, PointsCalculator, RecordedActivity,
};
use activity_engine::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
use activity_types::PartySignature;
use std::sync::Arc;

pub struct LoyaltyProcessManager {
    calculator: PointsCalculator,
    double_points: DoublePointsRule,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    events: Vec<LoyaltyEvent>,
}

impl LoyaltyProcessManager {
    pub fn new(calculator: PointsCalculator, double_points: DoublePointsRule) -> Self {
        Self {
            calculator,
            double_points,
            ids: Arc::new(UuidIdGenerator),
            clock: Arc::new(SystemClock),
            events: Vec::new(),
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record a member activity and open the incentive it earns
    ///
    /// The campaign must be active and run the activity's category.
    pub fn record_activity(
        &self,
        campaign: &mut LoyaltyCampaign,
        category: ActivityCategory,
        member_id: &str,
        event_type: &str,
    ) -> IncentiveResult<IncentiveAction> {
        if !campaign.is_active() {
            return Err(IncentiveError::CampaignNotActive {
                campaign_id: campaign.id().to_string(),
                status: campaign.status(),
            });
        }
        if !campaign.has_category(category) {
            return Err(IncentiveError::CategoryNotInCampaign {
                campaign_id: campaign.id().to_string(),
                category,
            });
        }

        let now = self.clock.now();
        let activity_id = self.ids.next_id("act");
        let incentive = IncentiveAction::new(self.ids.as_ref(), member_id, category, now);
        campaign.record(RecordedActivity {
            id: activity_id,
            member_id: member_id.to_string(),
            category,
            event_type: event_type.to_string(),
            incentive_id: incentive.id().to_string(),
            settled: false,
            occurred_at: now,
        });

        tracing::info!(
            campaign = %campaign.id(),
            incentive = %incentive.id(),
            member = %member_id,
            category = %category,
            event_type = %event_type,
            "Activity recorded"
        );
        Ok(incentive)
    }

    /// Evaluate an incentive and approve it with a points decision
    ///
    /// Gold members above the order threshold earn the bonus multiplier on
    /// top of the category one. Returns the points approved.
    pub fn evaluate_and_approve(
        &self,
        incentive: &mut IncentiveAction,
        base_amount: f64,
        is_gold_member: bool,
        evaluator: PartySignature,
    ) -> IncentiveResult<i64> {
        let category = incentive.category();
        let points =
            self.double_points
                .points(&self.calculator, category, is_gold_member, base_amount)?;
        let decision = IncentiveDecision::points(
            incentive.member_id(),
            points,
            format!("Points for {category}: {base_amount:.2}"),
        );

        incentive.evaluate(evaluator)?;
        incentive.approve_with(decision, self.clock.now())?;
        tracing::debug!(
            incentive = %incentive.id(),
            points,
            bonus = self.double_points.applies(is_gold_member, base_amount),
            "Incentive approved"
        );
        Ok(points)
    }

    /// Settle an approved incentive and emit `IncentiveSettled`
    pub fn settle(
        &mut self,
        incentive: &mut IncentiveAction,
        campaign: &mut LoyaltyCampaign,
    ) -> IncentiveResult<()> {
        if campaign.find_activity(incentive.id()).is_none() {
            return Err(IncentiveError::UnknownIncentive {
                campaign_id: campaign.id().to_string(),
                incentive_id: incentive.id().to_string(),
            });
        }

        let now = self.clock.now();
        incentive.settle_approved(now)?;
        campaign.mark_settled(incentive.id())?;

        let outcome_code = incentive
            .decision()
            .map(|d| d.outcome_code())
            .unwrap_or(IncentiveDecision::POINTS_GRANTED);
        self.events.push(LoyaltyEvent::IncentiveSettled {
            campaign_id: campaign.id().to_string(),
            incentive_id: incentive.id().to_string(),
            member_id: incentive.member_id().to_string(),
            outcome_code: outcome_code.to_string(),
            points_granted: incentive.total_points(),
            occurred_at: now,
        });
        Ok(())
    }

    /// Reverse a settled incentive on a chargeback and emit `IncentiveReversed`
    pub fn reverse(&mut self, incentive: &mut IncentiveAction, reason: &str) -> IncentiveResult<()> {
        let now = self.clock.now();
        incentive.reverse(reason, now)?;
        self.events.push(LoyaltyEvent::IncentiveReversed {
            incentive_id: incentive.id().to_string(),
            member_id: incentive.member_id().to_string(),
            reason: reason.to_string(),
            occurred_at: now,
        });
        Ok(())
    }

    /// Drain buffered events
    pub fn release_events(&mut self) -> Vec<LoyaltyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[LoyaltyEvent] {
        &self.events
    }
}

impl Default for LoyaltyProcessManager {
    fn default() -> Self {
        Self::new(PointsCalculator::default(), DoublePointsRule::default())
    }
}
