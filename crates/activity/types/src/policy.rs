//! Directive conflict policies
//!
//! Conflict resolution is pluggable per scenario: an enterprise flow may
//! escalate on any ambiguity while a simpler flow lets the most severe
//! directive win. Ambiguity is resolved here, never raised as an error.

use crate::OutcomeDirective;
use serde::{Deserialize, Serialize};

/// Collapses the directives of one completion into the ones applied
pub trait DirectiveConflictPolicy: Send + Sync {
    /// Name for diagnostics
    fn name(&self) -> &str;

    fn resolve(&self, directives: &[OutcomeDirective]) -> Vec<OutcomeDirective>;
}

fn composables<'a>(
    directives: &'a [OutcomeDirective],
) -> impl Iterator<Item = &'a OutcomeDirective> + 'a {
    directives.iter().filter(|d| d.is_composable())
}

// ── Escalate On Conflict ─────────────────────────────────────────────

/// More than one non-composable directive collapses to a single `Escalate`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscalateOnConflictPolicy;

impl DirectiveConflictPolicy for EscalateOnConflictPolicy {
    fn name(&self) -> &str {
        "escalate_on_conflict"
    }

    fn resolve(&self, directives: &[OutcomeDirective]) -> Vec<OutcomeDirective> {
        let non_composable = directives.iter().filter(|d| !d.is_composable()).count();
        if non_composable > 1 {
            return vec![OutcomeDirective::Escalate];
        }
        directives.to_vec()
    }
}

// ── Terminal Wins ────────────────────────────────────────────────────

/// The most urgent terminal directive wins; spawns always pass through
///
/// Without a terminal directive, the most urgent non-composable one wins
/// when there is more than one. Equal priorities keep the first occurrence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerminalWinsPolicy;

impl DirectiveConflictPolicy for TerminalWinsPolicy {
    fn name(&self) -> &str {
        "terminal_wins"
    }

    fn resolve(&self, directives: &[OutcomeDirective]) -> Vec<OutcomeDirective> {
        let terminal = directives
            .iter()
            .filter(|d| d.is_terminal())
            .min_by_key(|d| d.priority());

        let winner = match terminal {
            Some(terminal) => terminal,
            None => {
                let non_composable: Vec<_> =
                    directives.iter().filter(|d| !d.is_composable()).collect();
                if non_composable.len() <= 1 {
                    return directives.to_vec();
                }
                let Some(most_urgent) = non_composable.into_iter().min_by_key(|d| d.priority())
                else {
                    return directives.to_vec();
                };
                most_urgent
            }
        };

        std::iter::once(winner)
            .chain(composables(directives))
            .cloned()
            .collect()
    }
}

// ── Scenario Choice ──────────────────────────────────────────────────

/// The policy a scenario blueprint declares
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicyKind {
    EscalateOnConflict,
    TerminalWins,
}

impl DirectiveConflictPolicy for ConflictPolicyKind {
    fn name(&self) -> &str {
        match self {
            Self::EscalateOnConflict => EscalateOnConflictPolicy.name(),
            Self::TerminalWins => TerminalWinsPolicy.name(),
        }
    }

    fn resolve(&self, directives: &[OutcomeDirective]) -> Vec<OutcomeDirective> {
        match self {
            Self::EscalateOnConflict => EscalateOnConflictPolicy.resolve(directives),
            Self::TerminalWins => TerminalWinsPolicy.resolve(directives),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutcomeDirectiveSet;

    fn spawn(step: &str) -> OutcomeDirective {
        OutcomeDirective::spawn_step(step, "kyc")
    }

    #[test]
    fn test_escalate_on_conflict_collapses_ambiguity() {
        let set = OutcomeDirectiveSet::new(vec![
            OutcomeDirective::advance_stage(),
            OutcomeDirective::retry_step("kyc_doc_verification"),
        ]);
        assert_eq!(
            set.resolve(&EscalateOnConflictPolicy),
            vec![OutcomeDirective::Escalate]
        );
    }

    #[test]
    fn test_escalate_on_conflict_passes_spawns_through() {
        let input = vec![OutcomeDirective::advance_stage(), spawn("manual_review")];
        let set = OutcomeDirectiveSet::new(input.clone());
        assert_eq!(set.resolve(&EscalateOnConflictPolicy), input);
    }

    #[test]
    fn test_escalate_on_conflict_drops_spawns_when_collapsing() {
        let set = OutcomeDirectiveSet::new(vec![
            OutcomeDirective::advance_stage(),
            spawn("manual_review"),
            OutcomeDirective::complete_process(),
        ]);
        assert_eq!(
            set.resolve(&EscalateOnConflictPolicy),
            vec![OutcomeDirective::Escalate]
        );
    }

    #[test]
    fn test_terminal_wins_over_advance() {
        let set = OutcomeDirectiveSet::new(vec![
            OutcomeDirective::advance_stage(),
            OutcomeDirective::fail_process("r"),
        ]);
        assert_eq!(
            set.resolve(&TerminalWinsPolicy),
            vec![OutcomeDirective::fail_process("r")]
        );
    }

    #[test]
    fn test_terminal_wins_keeps_spawns() {
        let set = OutcomeDirectiveSet::new(vec![
            OutcomeDirective::fail_process("r"),
            spawn("manual_review"),
        ]);
        assert_eq!(
            set.resolve(&TerminalWinsPolicy),
            vec![OutcomeDirective::fail_process("r"), spawn("manual_review")]
        );
    }

    #[test]
    fn test_terminal_wins_picks_most_urgent_terminal() {
        let set = OutcomeDirectiveSet::new(vec![
            OutcomeDirective::hold("docs missing"),
            OutcomeDirective::escalate(),
            OutcomeDirective::advance_stage(),
        ]);
        assert_eq!(set.resolve(&TerminalWinsPolicy), vec![OutcomeDirective::Escalate]);
    }

    #[test]
    fn test_terminal_wins_without_terminal() {
        let set = OutcomeDirectiveSet::new(vec![
            OutcomeDirective::complete_process(),
            spawn("welcome_call"),
            OutcomeDirective::retry_step("auto_kyc"),
        ]);
        assert_eq!(
            set.resolve(&TerminalWinsPolicy),
            vec![OutcomeDirective::retry_step("auto_kyc"), spawn("welcome_call")]
        );
    }

    #[test]
    fn test_terminal_wins_single_directive_unchanged() {
        let input = vec![spawn("a"), OutcomeDirective::advance_stage(), spawn("b")];
        assert_eq!(TerminalWinsPolicy.resolve(&input), input);
    }

    #[test]
    fn test_policies_accept_empty_input() {
        assert!(EscalateOnConflictPolicy.resolve(&[]).is_empty());
        assert!(TerminalWinsPolicy.resolve(&[]).is_empty());
    }

    #[test]
    fn test_kind_delegates() {
        let input = vec![
            OutcomeDirective::advance_stage(),
            OutcomeDirective::fail_process("r"),
        ];
        assert_eq!(
            ConflictPolicyKind::EscalateOnConflict.resolve(&input),
            vec![OutcomeDirective::Escalate]
        );
        assert_eq!(
            ConflictPolicyKind::TerminalWins.resolve(&input),
            vec![OutcomeDirective::fail_process("r")]
        );
        assert_eq!(ConflictPolicyKind::TerminalWins.name(), "terminal_wins");
    }

    #[test]
    fn test_kind_serde() {
        let kind: ConflictPolicyKind = serde_json::from_str("\"terminal_wins\"").unwrap();
        assert_eq!(kind, ConflictPolicyKind::TerminalWins);
    }
}
