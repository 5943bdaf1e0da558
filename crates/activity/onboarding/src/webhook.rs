//! Vendor webhook payloads and their status vocabularies

use crate::vendors::{DOCUSIGN_VENDOR, INFRASTRUCTURE_VENDOR, KYC_VENDOR};
use activity_engine::Command;
use activity_types::{ActivityError, ActivityResult};
use serde::{Deserialize, Serialize};

/// Body of a vendor callback
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorPayload {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
}

/// Outcome code a vendor status stands for
pub fn outcome_code(vendor: &str, status: &str) -> ActivityResult<&'static str> {
    let code = match (vendor, status) {
        (KYC_VENDOR, "verified") => Some("accepted"),
        (KYC_VENDOR, "needs_info") => Some("needs_supplement"),
        (KYC_VENDOR, "rejected") => Some("rejected"),
        (KYC_VENDOR, "suspicious") => Some("suspicious"),
        (DOCUSIGN_VENDOR, "completed") => Some("signed"),
        (DOCUSIGN_VENDOR, "declined" | "voided") => Some("declined"),
        (INFRASTRUCTURE_VENDOR, "provisioned") => Some("provisioned"),
        (INFRASTRUCTURE_VENDOR, "failed") => Some("provisioning_failed"),
        _ => None,
    };
    code.ok_or_else(|| ActivityError::UnknownVendorStatus {
        vendor: vendor.to_string(),
        status: status.to_string(),
    })
}

impl VendorPayload {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            reason: None,
            external_reference: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.external_reference = Some(reference.into());
        self
    }

    /// Translate into the engine command that records the outcome
    ///
    /// `route_reference` is the reference carried by the webhook URL, used
    /// when the body does not name one.
    pub fn into_command(self, vendor: &str, route_reference: Option<&str>) -> ActivityResult<Command> {
        let outcome_code = outcome_code(vendor, &self.status)?;
        let external_reference = self
            .external_reference
            .or_else(|| route_reference.map(str::to_string))
            .ok_or_else(|| ActivityError::MissingCallbackReference {
                vendor: vendor.to_string(),
            })?;

        Ok(Command::RecordExternalOutcome {
            external_reference,
            outcome_code: outcome_code.to_string(),
            description: format!("{vendor} reported {}", self.status),
            vendor: vendor.to_string(),
            reason: self.reason,
        })
    }
}
