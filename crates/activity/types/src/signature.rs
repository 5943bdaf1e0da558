use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A party that initiated or approved an action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySignature {
    pub party_id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
}

impl PartySignature {
    /// Role assigned to external systems that verify a step on our behalf
    pub const EXTERNAL_VERIFIER: &str = "external_verifier";

    pub fn new(party_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            party_id: party_id.into(),
            role: role.into(),
            signed_at: None,
        }
    }

    pub fn signed(party_id: impl Into<String>, role: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            signed_at: Some(at),
            ..Self::new(party_id, role)
        }
    }

    /// Signature of a vendor reporting an external result
    pub fn vendor(vendor: &str, at: DateTime<Utc>) -> Self {
        Self::signed(format!("vendor:{vendor}"), Self::EXTERNAL_VERIFIER, at)
    }

    pub fn is_signed(&self) -> bool {
        self.signed_at.is_some()
    }
}
