//! Identifier generation
//!
//! Ids come from an injected generator instead of process-wide counters.
//! Production uses UUIDs; tests use a sequential generator so ids are
//! predictable.

use activity_types::{ActionId, CaseId, StepCode};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of fresh identifiers
pub trait IdGenerator: Send + Sync {
    /// A fresh id carrying the given prefix
    fn next_id(&self, prefix: &str) -> String;

    fn case_id(&self) -> CaseId {
        CaseId::new(self.next_id("case"))
    }

    /// Id for a new instance of a step within a case
    fn action_id(&self, case_id: &CaseId, step_code: &StepCode) -> ActionId {
        ActionId::new(self.next_id(&format!("{case_id}_{step_code}")))
    }
}

/// Random UUID ids
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4())
    }
}

/// Deterministic `{prefix}-{n}` ids, counting from 1
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}-{n}")
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for std::sync::Arc<G> {
    fn next_id(&self, prefix: &str) -> String {
        (**self).next_id(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id("loy"), "loy-1");
        assert_eq!(ids.next_id("loy"), "loy-2");
        assert_eq!(ids.case_id(), CaseId::new("case-3"));
        assert_eq!(
            ids.action_id(&CaseId::new("c1"), &StepCode::new("auto_kyc")),
            ActionId::new("c1_auto_kyc-4")
        );
        assert_eq!(ids.issued(), 4);
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids = UuidIdGenerator;
        let a = ids.next_id("case");
        let b = ids.next_id("case");
        assert!(a.starts_with("case-"));
        assert_ne!(a, b);
    }
}
