//! Property tests: the action state machine accepts exactly its legal moves.

use activity_engine::Action;
use activity_types::ActionState::*;
use activity_types::*;
use chrono::Utc;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

/// Legal moves, written out pair by pair
const LEGAL: &[(ActionState, ActionState)] = &[
    (Draft, Pending),
    (Pending, InProgress),
    (Pending, OnHold),
    (InProgress, AwaitingApproval),
    (InProgress, Completed),
    (InProgress, Failed),
    (InProgress, Escalated),
    (AwaitingApproval, Completed),
    (AwaitingApproval, Failed),
    (Failed, InProgress),
    (OnHold, Pending),
];

const STATES: [ActionState; 8] = [
    Draft,
    Pending,
    InProgress,
    AwaitingApproval,
    Completed,
    Failed,
    OnHold,
    Escalated,
];

fn is_legal(from: ActionState, to: ActionState) -> bool {
    LEGAL.contains(&(from, to))
}

/// Moves that bring a fresh Draft action to `state`
fn path_to(state: ActionState) -> &'static [ActionState] {
    match state {
        Draft => &[],
        Pending => &[Pending],
        InProgress => &[Pending, InProgress],
        AwaitingApproval => &[Pending, InProgress, AwaitingApproval],
        Completed => &[Pending, InProgress, Completed],
        Failed => &[Pending, InProgress, Failed],
        OnHold => &[Pending, OnHold],
        Escalated => &[Pending, InProgress, Escalated],
    }
}

fn action_in(state: ActionState) -> Action {
    let blueprint = StepBlueprint::new("review", "Review")
        .with_outcome("ok", "Ok", OutcomeDirective::advance_stage());
    let mut action = Action::from_blueprint(ActionId::new("a-1"), &blueprint, Utc::now());
    for &step in path_to(state) {
        action.transition_to(step).unwrap();
    }
    assert_eq!(action.state(), state);
    action
}

fn arb_state() -> impl Strategy<Value = ActionState> {
    prop::sample::select(STATES.to_vec())
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// transition_to succeeds exactly for legal pairs and otherwise leaves
    /// the action untouched.
    #[test]
    fn transition_matches_table(from in arb_state(), to in arb_state()) {
        let mut action = action_in(from);
        let before = action.clone();

        match action.transition_to(to) {
            Ok(previous) => {
                prop_assert!(is_legal(from, to), "{} -> {} was accepted", from, to);
                prop_assert_eq!(previous, from);
                prop_assert_eq!(action.state(), to);
            }
            Err(err) => {
                prop_assert!(!is_legal(from, to), "{} -> {} was refused", from, to);
                prop_assert_eq!(err, ActivityError::InvalidStateTransition { from, to });
                prop_assert_eq!(action, before);
            }
        }
    }

    /// The declared transition table agrees with the written-out one.
    #[test]
    fn declared_table_matches(from in arb_state(), to in arb_state()) {
        prop_assert_eq!(from.can_transition_to(to), is_legal(from, to));
    }
}

#[test]
fn every_pair_is_covered() {
    let mut accepted = 0;
    for from in STATES {
        for to in STATES {
            let mut action = action_in(from);
            let result = action.transition_to(to);
            assert_eq!(result.is_ok(), is_legal(from, to), "{from} -> {to}");
            if result.is_ok() {
                accepted += 1;
            } else {
                assert_eq!(action.state(), from);
            }
        }
    }
    assert_eq!(accepted, LEGAL.len());
    assert_eq!(STATES.len(), ActionState::ALL.len());
}
