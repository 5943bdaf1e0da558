//! Property tests: the incentive state table and its bookkeeping.

use activity_engine::SequentialIdGenerator;
use activity_loyalty::*;
use activity_types::{LifecycleState, PartySignature};
use chrono::Utc;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

const MEMBER: &str = "member-1";

#[derive(Clone, Debug)]
enum Op {
    Evaluate,
    Approve,
    Settle(i64),
    Reject,
    Reverse,
}

impl Op {
    /// State the operation moves to when it is legal
    fn target(&self) -> IncentiveState {
        match self {
            Op::Evaluate => IncentiveState::Evaluating,
            Op::Approve => IncentiveState::AwaitingSettlement,
            Op::Settle(_) => IncentiveState::Settled,
            Op::Reject => IncentiveState::Rejected,
            Op::Reverse => IncentiveState::Reversed,
        }
    }

    fn legal_from(&self, current: IncentiveState) -> bool {
        match self {
            // Settling approves on the way when still evaluating
            Op::Settle(_) if current == IncentiveState::Evaluating => true,
            _ => current.can_transition_to(self.target()),
        }
    }
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Evaluate),
        Just(Op::Approve),
        (1i64..10_000).prop_map(Op::Settle),
        Just(Op::Reject),
        Just(Op::Reverse),
    ]
}

#[derive(Clone, Copy, Debug)]
enum CampaignOp {
    Activate,
    Suspend,
    Complete,
    Record,
}

fn arb_campaign_op() -> impl Strategy<Value = CampaignOp> {
    prop_oneof![
        Just(CampaignOp::Activate),
        Just(CampaignOp::Suspend),
        Just(CampaignOp::Complete),
        Just(CampaignOp::Record),
    ]
}

fn arb_state() -> impl Strategy<Value = IncentiveState> {
    prop::sample::select(IncentiveState::ALL.to_vec())
}

fn apply(action: &mut IncentiveAction, op: &Op) -> IncentiveResult<()> {
    let now = Utc::now();
    match op {
        Op::Evaluate => action.evaluate(PartySignature::new("rules", "evaluator")),
        Op::Approve => action.approve(now),
        Op::Settle(points) => action.settle(IncentiveDecision::points(MEMBER, *points, "earned"), now),
        Op::Reject => action.reject("declined", now),
        Op::Reverse => action.reverse("chargeback", now),
    }
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Every operation succeeds exactly when the table allows it, and a
    /// refused operation changes nothing.
    #[test]
    fn operations_follow_the_table(ops in prop::collection::vec(arb_op(), 1..20)) {
        let mut action = IncentiveAction::new(&SequentialIdGenerator::new(), MEMBER, ActivityCategory::Purchases, Utc::now());
        for op in &ops {
            let before = action.clone();
            let legal = op.legal_from(action.state());
            let result = apply(&mut action, op);
            prop_assert_eq!(result.is_ok(), legal, "{:?} from {}", op, before.state());
            if result.is_ok() {
                prop_assert_eq!(action.state(), op.target());
            } else {
                prop_assert_eq!(&action, &before);
            }
        }
    }

    /// Net points are never negative, and a reversed incentive nets zero.
    #[test]
    fn reversal_nets_zero(ops in prop::collection::vec(arb_op(), 1..20)) {
        let mut action = IncentiveAction::new(&SequentialIdGenerator::new(), MEMBER, ActivityCategory::Referrals, Utc::now());
        for op in &ops {
            let _ = apply(&mut action, op);
            prop_assert!(action.total_points() >= 0);
        }
        if action.state() == IncentiveState::Reversed {
            prop_assert_eq!(action.total_points(), 0);
        }
    }

    /// States with no exits are terminal.
    #[test]
    fn dead_ends_are_terminal(state in arb_state()) {
        if state.valid_transitions().is_empty() {
            prop_assert!(state.is_terminal());
        }
    }

    /// Category points scale monotonically with the amount.
    #[test]
    fn points_are_monotonic(a in 0.0f64..100_000.0, b in 0.0f64..100_000.0) {
        let calc = PointsCalculator::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        for category in [ActivityCategory::Purchases, ActivityCategory::Referrals, ActivityCategory::Reviews] {
            prop_assert!(calc.calculate(category, low).unwrap() <= calc.calculate(category, high).unwrap());
        }
    }

    /// Campaign moves follow the status table, and activities are only
    /// recorded while the campaign is active.
    #[test]
    fn campaign_follows_its_table(ops in prop::collection::vec(arb_campaign_op(), 1..20)) {
        let pm = LoyaltyProcessManager::default()
            .with_ids(std::sync::Arc::new(SequentialIdGenerator::new()));
        let now = Utc::now();
        let mut campaign = LoyaltyCampaign::new("camp-p", "Property season", now, now)
            .with_category(ActivityCategory::Reviews);

        for op in ops {
            let status = campaign.status();
            let recorded = campaign.activities().len();
            let (result, target) = match op {
                CampaignOp::Activate => (campaign.activate(), Some(CampaignStatus::Active)),
                CampaignOp::Suspend => (campaign.suspend(), Some(CampaignStatus::Suspended)),
                CampaignOp::Complete => (campaign.complete(), Some(CampaignStatus::Completed)),
                CampaignOp::Record => (
                    pm.record_activity(&mut campaign, ActivityCategory::Reviews, MEMBER, "review")
                        .map(|_| ()),
                    None,
                ),
            };

            match target {
                Some(target) => {
                    prop_assert_eq!(result.is_ok(), status.can_transition_to(target));
                    let expected = if result.is_ok() { target } else { status };
                    prop_assert_eq!(campaign.status(), expected);
                }
                None => {
                    prop_assert_eq!(result.is_ok(), status == CampaignStatus::Active);
                    let grown = usize::from(result.is_ok());
                    prop_assert_eq!(campaign.activities().len(), recorded + grown);
                }
            }
        }
    }
}
