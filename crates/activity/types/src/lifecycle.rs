use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a lifecycle handler did with a step transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LifecycleResult {
    /// The side effect finished synchronously
    Completed {
        message: String,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        metadata: HashMap<String, String>,
    },
    /// The side effect is in flight. A pending callback has been stored.
    AwaitingCallback { external_reference: String },
    Failed { message: String },
}

impl LifecycleResult {
    pub fn completed(message: impl Into<String>) -> Self {
        Self::Completed {
            message: message.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn completed_with(message: impl Into<String>, metadata: HashMap<String, String>) -> Self {
        Self::Completed {
            message: message.into(),
            metadata,
        }
    }

    pub fn awaiting_callback(external_reference: impl Into<String>) -> Self {
        Self::AwaitingCallback {
            external_reference: external_reference.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn is_awaiting_callback(&self) -> bool {
        matches!(self, Self::AwaitingCallback { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn external_reference(&self) -> Option<&str> {
        match self {
            Self::AwaitingCallback { external_reference } => Some(external_reference),
            _ => None,
        }
    }
}
