//! Scenario registry: stores and retrieves scenario blueprints
//!
//! Blueprints are validated on the way in and immutable once registered.
//! To change a scenario, remove it and register the new shape.

use activity_types::{ActivityError, ActivityResult, ScenarioBlueprint, ScenarioCode};
use std::collections::HashMap;

/// Registry of scenario blueprints
#[derive(Clone, Debug, Default)]
pub struct ScenarioRegistry {
    scenarios: HashMap<ScenarioCode, ScenarioBlueprint>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scenario
    ///
    /// Validates the blueprint first. Returns the scenario code.
    pub fn register(&mut self, scenario: ScenarioBlueprint) -> ActivityResult<ScenarioCode> {
        scenario.validate()?;

        let code = scenario.scenario_code.clone();
        if self.scenarios.contains_key(&code) {
            return Err(ActivityError::DuplicateScenario(code));
        }
        self.scenarios.insert(code.clone(), scenario);

        tracing::info!(scenario = %code, "Scenario registered");
        Ok(code)
    }

    pub fn get(&self, code: &ScenarioCode) -> ActivityResult<&ScenarioBlueprint> {
        self.scenarios
            .get(code)
            .ok_or_else(|| ActivityError::ScenarioNotFound(code.to_string()))
    }

    pub fn remove(&mut self, code: &ScenarioCode) -> Option<ScenarioBlueprint> {
        self.scenarios.remove(code)
    }

    /// All registered scenarios, ordered by code
    pub fn list(&self) -> Vec<&ScenarioBlueprint> {
        let mut scenarios: Vec<_> = self.scenarios.values().collect();
        scenarios.sort_by(|a, b| a.scenario_code.cmp(&b.scenario_code));
        scenarios
    }

    pub fn count(&self) -> usize {
        self.scenarios.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_types::*;

    fn scenario(code: &str) -> ScenarioBlueprint {
        ScenarioBlueprint::new(code, "", ConflictPolicyKind::TerminalWins).with_stage(
            StageBlueprint::new("only", "").with_step(
                StepBlueprint::new("do_it", "")
                    .with_outcome("done", "Done", OutcomeDirective::complete_process()),
            ),
        )
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ScenarioRegistry::new();
        let code = registry.register(scenario("b")).unwrap();
        registry.register(scenario("a")).unwrap();
        assert_eq!(registry.get(&code).unwrap().scenario_code, code);
        assert_eq!(registry.count(), 2);
        let codes: Vec<_> = registry
            .list()
            .iter()
            .map(|s| s.scenario_code.as_str())
            .collect();
        assert_eq!(codes, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ScenarioRegistry::new();
        registry.register(scenario("a")).unwrap();
        assert_eq!(
            registry.register(scenario("a")).unwrap_err(),
            ActivityError::DuplicateScenario(ScenarioCode::new("a"))
        );
    }

    #[test]
    fn test_invalid_rejected() {
        let mut registry = ScenarioRegistry::new();
        let empty = ScenarioBlueprint::new("empty", "", ConflictPolicyKind::TerminalWins);
        assert!(registry.register(empty).is_err());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_missing_and_remove() {
        let mut registry = ScenarioRegistry::new();
        registry.register(scenario("a")).unwrap();
        assert!(registry.remove(&ScenarioCode::new("a")).is_some());
        assert!(matches!(
            registry.get(&ScenarioCode::new("a")),
            Err(ActivityError::ScenarioNotFound(_))
        ));
    }
}
