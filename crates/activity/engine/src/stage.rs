use crate::Action;
use activity_types::{ActionId, StageBlueprint, StageCode, StepCode};
use serde::{Deserialize, Serialize};

/// A group of actions within a case
///
/// A step may have several instances after a retry or a spawn; lookups by
/// step code return the latest one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    stage_code: StageCode,
    description: String,
    actions: Vec<Action>,
    completed: bool,
}

impl Stage {
    pub fn from_blueprint(blueprint: &StageBlueprint) -> Self {
        Self {
            stage_code: blueprint.stage_code.clone(),
            description: blueprint.description.clone(),
            actions: Vec::new(),
            completed: false,
        }
    }

    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn stage_code(&self) -> &StageCode {
        &self.stage_code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Latest instance of a step
    pub fn find_action(&self, step_code: &StepCode) -> Option<&Action> {
        self.actions
            .iter()
            .rev()
            .find(|a| a.action_type() == step_code)
    }

    pub(crate) fn find_action_mut(&mut self, step_code: &StepCode) -> Option<&mut Action> {
        self.actions
            .iter_mut()
            .rev()
            .find(|a| a.action_type() == step_code)
    }

    pub fn find_action_by_id(&self, id: &ActionId) -> Option<&Action> {
        self.actions.iter().find(|a| a.id() == id)
    }

    pub(crate) fn find_action_by_id_mut(&mut self, id: &ActionId) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| a.id() == id)
    }

    /// Latest instance of every step, in first-seen order
    pub fn current_actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().enumerate().filter_map(|(i, action)| {
            let superseded = self.actions[i + 1..]
                .iter()
                .any(|later| later.action_type() == action.action_type());
            (!superseded).then_some(action)
        })
    }

    /// First current instance that has not reached a terminal state
    ///
    /// Instances replaced by a retry or a later spawn of the same step no
    /// longer count.
    pub fn unsettled_action(&self) -> Option<&Action> {
        self.current_actions().find(|a| !a.is_terminal())
    }

    /// Whether every current instance has reached a terminal state
    pub fn is_settled(&self) -> bool {
        !self.actions.is_empty() && self.unsettled_action().is_none()
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}
