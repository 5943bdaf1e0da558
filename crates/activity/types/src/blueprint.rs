//! Blueprints: the declarative shape of a scenario
//!
//! A scenario has ordered stages, a stage has a set of steps and a step
//! has its possible outcomes, each mapped to exactly one directive. All of
//! it is fixed before any case runs, so the orchestrator can reason about a
//! step without knowing the business rules behind it.

use crate::{
    ActivityError, ActivityResult, ConflictPolicyKind, OutcomeDirective, ScenarioCode, StageCode,
    StepCode,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ── Outcome Blueprint ────────────────────────────────────────────────

/// A declared outcome of a step and the directive it produces
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeBlueprint {
    pub code: String,
    pub description: String,
    pub directive: OutcomeDirective,
}

impl OutcomeBlueprint {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        directive: OutcomeDirective,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            directive,
        }
    }
}

// ── Step Blueprint ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct StepBlueprintSpec {
    step_code: StepCode,
    #[serde(default)]
    description: String,
    possible_outcomes: Vec<OutcomeBlueprint>,
}

/// A step and its outcome vocabulary
///
/// Outcomes are indexed by code. Deserialization rejects duplicate codes;
/// the builder replaces an earlier declaration of the same code in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StepBlueprintSpec")]
pub struct StepBlueprint {
    pub step_code: StepCode,
    pub description: String,
    possible_outcomes: Vec<OutcomeBlueprint>,
    #[serde(skip_serializing)]
    by_code: HashMap<String, usize>,
}

impl StepBlueprint {
    pub fn new(step_code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            step_code: StepCode::new(step_code),
            description: description.into(),
            possible_outcomes: Vec::new(),
            by_code: HashMap::new(),
        }
    }

    pub fn with_outcome(
        mut self,
        code: impl Into<String>,
        description: impl Into<String>,
        directive: OutcomeDirective,
    ) -> Self {
        self.push_outcome(OutcomeBlueprint::new(code, description, directive));
        self
    }

    fn push_outcome(&mut self, outcome: OutcomeBlueprint) {
        match self.by_code.get(&outcome.code) {
            Some(&idx) => self.possible_outcomes[idx] = outcome,
            None => {
                self.by_code
                    .insert(outcome.code.clone(), self.possible_outcomes.len());
                self.possible_outcomes.push(outcome);
            }
        }
    }

    pub fn possible_outcomes(&self) -> &[OutcomeBlueprint] {
        &self.possible_outcomes
    }

    pub fn outcome(&self, code: &str) -> Option<&OutcomeBlueprint> {
        self.by_code
            .get(code)
            .and_then(|&idx| self.possible_outcomes.get(idx))
    }

    pub fn declares(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Directive declared for an outcome code
    pub fn directive_for(&self, code: &str) -> Option<&OutcomeDirective> {
        self.outcome(code).map(|o| &o.directive)
    }

    pub fn outcome_codes(&self) -> impl Iterator<Item = &str> {
        self.possible_outcomes.iter().map(|o| o.code.as_str())
    }
}

impl TryFrom<StepBlueprintSpec> for StepBlueprint {
    type Error = ActivityError;

    fn try_from(spec: StepBlueprintSpec) -> Result<Self, Self::Error> {
        let mut step = StepBlueprint::new(spec.step_code.0, spec.description);
        for outcome in spec.possible_outcomes {
            if step.declares(&outcome.code) {
                return Err(ActivityError::InvalidBlueprint(format!(
                    "step {} declares outcome '{}' twice",
                    step.step_code, outcome.code
                )));
            }
            step.push_outcome(outcome);
        }
        Ok(step)
    }
}

// ── Stage Blueprint ──────────────────────────────────────────────────

/// A group of steps that must settle before the case moves on
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageBlueprint {
    pub stage_code: StageCode,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<StepBlueprint>,
}

impl StageBlueprint {
    pub fn new(stage_code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            stage_code: StageCode::new(stage_code),
            description: description.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: StepBlueprint) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step(&self, step_code: &StepCode) -> Option<&StepBlueprint> {
        self.steps.iter().find(|s| &s.step_code == step_code)
    }
}

// ── Scenario Blueprint ───────────────────────────────────────────────

/// The full declaration of a process and its conflict posture
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioBlueprint {
    pub scenario_code: ScenarioCode,
    #[serde(default)]
    pub description: String,
    pub stages: Vec<StageBlueprint>,
    pub conflict_policy: ConflictPolicyKind,
}

impl ScenarioBlueprint {
    pub fn new(
        scenario_code: impl Into<String>,
        description: impl Into<String>,
        conflict_policy: ConflictPolicyKind,
    ) -> Self {
        Self {
            scenario_code: ScenarioCode::new(scenario_code),
            description: description.into(),
            stages: Vec::new(),
            conflict_policy,
        }
    }

    pub fn with_stage(mut self, stage: StageBlueprint) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stage(&self, stage_code: &StageCode) -> Option<&StageBlueprint> {
        self.stages.iter().find(|s| &s.stage_code == stage_code)
    }

    /// Find a step anywhere in the scenario
    pub fn find_step(&self, step_code: &StepCode) -> Option<(&StageBlueprint, &StepBlueprint)> {
        self.stages
            .iter()
            .find_map(|stage| stage.step(step_code).map(|step| (stage, step)))
    }

    pub fn step_count(&self) -> usize {
        self.stages.iter().map(|s| s.steps.len()).sum()
    }

    /// Validate the blueprint's structure
    pub fn validate(&self) -> ActivityResult<()> {
        let invalid = |msg: String| Err(ActivityError::InvalidBlueprint(msg));

        if self.stages.is_empty() {
            return invalid(format!("scenario {} has no stages", self.scenario_code));
        }

        let mut stage_codes = HashSet::new();
        for stage in &self.stages {
            if !stage_codes.insert(&stage.stage_code) {
                return invalid(format!("duplicate stage {}", stage.stage_code));
            }
            if stage.steps.is_empty() {
                return invalid(format!("stage {} has no steps", stage.stage_code));
            }

            let mut step_codes = HashSet::new();
            for step in &stage.steps {
                if !step_codes.insert(&step.step_code) {
                    return invalid(format!(
                        "duplicate step {} in stage {}",
                        step.step_code, stage.stage_code
                    ));
                }
                if step.possible_outcomes.is_empty() {
                    return invalid(format!("step {} declares no outcomes", step.step_code));
                }
            }
        }

        for stage in &self.stages {
            for step in &stage.steps {
                for outcome in &step.possible_outcomes {
                    self.validate_target(step, outcome)?;
                }
            }
        }

        Ok(())
    }

    fn validate_target(&self, step: &StepBlueprint, outcome: &OutcomeBlueprint) -> ActivityResult<()> {
        match &outcome.directive {
            OutcomeDirective::RetryStep { step_code } if self.find_step(step_code).is_none() => {
                Err(ActivityError::InvalidBlueprint(format!(
                    "outcome '{}' of step {} retries unknown step {}",
                    outcome.code, step.step_code, step_code
                )))
            }
            OutcomeDirective::SpawnStep {
                step_code,
                stage_code,
            } => {
                if self.stage(stage_code).is_none() {
                    return Err(ActivityError::InvalidBlueprint(format!(
                        "outcome '{}' of step {} spawns into unknown stage {}",
                        outcome.code, step.step_code, stage_code
                    )));
                }
                if self.find_step(step_code).is_none() {
                    return Err(ActivityError::InvalidBlueprint(format!(
                        "outcome '{}' of step {} spawns unknown step {}",
                        outcome.code, step.step_code, step_code
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kyc_step() -> StepBlueprint {
        StepBlueprint::new("kyc_doc_verification", "Verify KYC documents")
            .with_outcome("accepted", "Documents accepted", OutcomeDirective::advance_stage())
            .with_outcome(
                "needs_supplement",
                "More documents needed",
                OutcomeDirective::retry_step("kyc_doc_verification"),
            )
            .with_outcome("rejected", "Documents rejected", OutcomeDirective::fail_process("KYC failed"))
    }

    fn scenario() -> ScenarioBlueprint {
        ScenarioBlueprint::new("test", "Test scenario", ConflictPolicyKind::EscalateOnConflict)
            .with_stage(StageBlueprint::new("kyc", "KYC").with_step(kyc_step()))
            .with_stage(
                StageBlueprint::new("activation", "Activation").with_step(
                    StepBlueprint::new("account_activation", "Activate").with_outcome(
                        "activated",
                        "Activated",
                        OutcomeDirective::complete_process(),
                    ),
                ),
            )
    }

    #[test]
    fn test_outcome_lookup() {
        let step = kyc_step();
        assert!(step.declares("accepted"));
        assert!(!step.declares("maybe"));
        assert_eq!(
            step.directive_for("rejected"),
            Some(&OutcomeDirective::fail_process("KYC failed"))
        );
        assert_eq!(
            step.outcome_codes().collect::<Vec<_>>(),
            vec!["accepted", "needs_supplement", "rejected"]
        );
    }

    #[test]
    fn test_builder_replaces_duplicate_outcome() {
        let step = kyc_step().with_outcome("accepted", "Accepted late", OutcomeDirective::hold("wait"));
        assert_eq!(step.possible_outcomes().len(), 3);
        assert_eq!(step.directive_for("accepted"), Some(&OutcomeDirective::hold("wait")));
    }

    #[test]
    fn test_find_step_across_stages() {
        let scenario = scenario();
        let (stage, step) = scenario
            .find_step(&StepCode::new("account_activation"))
            .unwrap();
        assert_eq!(stage.stage_code, StageCode::new("activation"));
        assert_eq!(step.description, "Activate");
        assert_eq!(scenario.step_count(), 2);
    }

    #[test]
    fn test_valid_scenario() {
        assert!(scenario().validate().is_ok());
    }

    #[test]
    fn test_empty_scenario_is_invalid() {
        let scenario = ScenarioBlueprint::new("empty", "", ConflictPolicyKind::TerminalWins);
        assert!(matches!(
            scenario.validate(),
            Err(ActivityError::InvalidBlueprint(_))
        ));
    }

    #[test]
    fn test_duplicate_stage_is_invalid() {
        let scenario = scenario().with_stage(StageBlueprint::new("kyc", "again").with_step(kyc_step()));
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_step_without_outcomes_is_invalid() {
        let scenario = scenario().with_stage(
            StageBlueprint::new("review", "Review").with_step(StepBlueprint::new("manual", "Manual")),
        );
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_dangling_retry_is_invalid() {
        let scenario = ScenarioBlueprint::new("s", "", ConflictPolicyKind::TerminalWins).with_stage(
            StageBlueprint::new("kyc", "").with_step(StepBlueprint::new("auto_kyc", "").with_outcome(
                "again",
                "",
                OutcomeDirective::retry_step("ghost"),
            )),
        );
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_spawn_target_must_exist() {
        let scenario = ScenarioBlueprint::new("s", "", ConflictPolicyKind::TerminalWins).with_stage(
            StageBlueprint::new("kyc", "").with_step(StepBlueprint::new("auto_kyc", "").with_outcome(
                "flagged",
                "",
                OutcomeDirective::spawn_step("auto_kyc", "review"),
            )),
        );
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_rebuilds_index() {
        let json = serde_json::to_string(&scenario()).unwrap();
        assert!(!json.contains("by_code"));
        let parsed: ScenarioBlueprint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scenario());
        let (_, step) = parsed
            .find_step(&StepCode::new("kyc_doc_verification"))
            .unwrap();
        assert!(step.declares("needs_supplement"));
    }

    #[test]
    fn test_duplicate_outcome_rejected_on_deserialize() {
        let json = r#"{
            "step_code": "auto_kyc",
            "possible_outcomes": [
                {"code": "accepted", "description": "", "directive": {"type": "advance_stage"}},
                {"code": "accepted", "description": "", "directive": {"type": "escalate"}}
            ]
        }"#;
        assert!(serde_json::from_str::<StepBlueprint>(json).is_err());
    }

    #[test]
    fn test_conflict_policy_is_required() {
        let steps = r#"[{
                "stage_code": "only",
                "steps": [{
                    "step_code": "do_it",
                    "possible_outcomes": [
                        {"code": "done", "description": "Done", "directive": {"type": "complete_process"}}
                    ]
                }]
            }]"#;

        let without = format!(r#"{{"scenario_code": "mini", "stages": {steps}}}"#);
        let err = serde_json::from_str::<ScenarioBlueprint>(&without).unwrap_err();
        assert!(err.to_string().contains("conflict_policy"));
        assert!(
            serde_json::from_str::<ScenarioBlueprint>(r#"{"scenario_code":"x","stages":[]}"#)
                .is_err()
        );

        let with = format!(
            r#"{{"scenario_code": "mini", "stages": {steps}, "conflict_policy": "terminal_wins"}}"#
        );
        let scenario: ScenarioBlueprint = serde_json::from_str(&with).unwrap();
        assert_eq!(scenario.conflict_policy, ConflictPolicyKind::TerminalWins);
        assert!(scenario.validate().is_ok());
    }
}
