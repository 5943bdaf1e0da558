use crate::Case;
use activity_types::{ActivityError, ActivityResult, CaseId};
use std::collections::HashMap;

/// Storage for cases
///
/// Implementations own persistence and must serialize writers per case id.
pub trait CaseRepository: Send + Sync {
    fn save(&mut self, case: Case) -> ActivityResult<()>;

    fn get(&self, id: &CaseId) -> ActivityResult<Case>;

    fn contains(&self, id: &CaseId) -> bool;

    fn ids(&self) -> Vec<CaseId>;
}

/// In-memory case store
#[derive(Clone, Debug, Default)]
pub struct InMemoryCaseRepository {
    cases: HashMap<CaseId, Case>,
}

impl InMemoryCaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl CaseRepository for InMemoryCaseRepository {
    fn save(&mut self, case: Case) -> ActivityResult<()> {
        self.cases.insert(case.id().clone(), case);
        Ok(())
    }

    fn get(&self, id: &CaseId) -> ActivityResult<Case> {
        self.cases
            .get(id)
            .cloned()
            .ok_or_else(|| ActivityError::CaseNotFound(id.clone()))
    }

    fn contains(&self, id: &CaseId) -> bool {
        self.cases.contains_key(id)
    }

    fn ids(&self) -> Vec<CaseId> {
        let mut ids: Vec<_> = self.cases.keys().cloned().collect();
        ids.sort();
        ids
    }
}
