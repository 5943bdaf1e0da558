//! Vendor clients used by the onboarding lifecycle handlers
//!
//! Each vendor sits behind a small trait so the handlers can be exercised
//! against the in-memory fakes below.

use activity_types::{ActionId, CaseId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub const KYC_VENDOR: &str = "kyc_provider";
pub const DOCUSIGN_VENDOR: &str = "docusign";
pub const INFRASTRUCTURE_VENDOR: &str = "infrastructure";

/// Errors a vendor call can return
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VendorError {
    /// The vendor could not be reached; the request never landed
    #[error("{vendor} unavailable: {message}")]
    Unavailable { vendor: String, message: String },

    /// The vendor refused the request outright
    #[error("{vendor} refused the request: {message}")]
    Refused { vendor: String, message: String },
}

impl VendorError {
    pub fn unavailable(vendor: &str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            vendor: vendor.to_string(),
            message: message.into(),
        }
    }

    pub fn refused(vendor: &str, message: impl Into<String>) -> Self {
        Self::Refused {
            vendor: vendor.to_string(),
            message: message.into(),
        }
    }
}

/// A request sent to a vendor, as the fakes record it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VendorRequest {
    pub case_id: CaseId,
    pub action_id: ActionId,
    pub reference: String,
}

// ── Clients ─────────────────────────────────────────────────────────

/// Document verification provider
pub trait KycVendorClient: Send + Sync {
    /// Submit documents for verification, returning the vendor reference
    fn request_verification(&self, case_id: &CaseId, action_id: &ActionId) -> Result<String, VendorError>;
}

/// E-signature provider
pub trait DocuSignClient: Send + Sync {
    /// Send the agreement envelope, returning the envelope id
    fn send_envelope(&self, case_id: &CaseId, action_id: &ActionId) -> Result<String, VendorError>;
}

/// What the infrastructure API did with a provisioning request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisioningResult {
    /// The environment exists now
    Ready { environment_id: String },
    /// Provisioning will finish later and report through a callback
    Queued { request_id: String },
}

/// Environment provisioning API
pub trait InfrastructureApi: Send + Sync {
    fn provision(&self, case_id: &CaseId, action_id: &ActionId) -> Result<ProvisioningResult, VendorError>;
}

// ── In-memory fakes ─────────────────────────────────────────────────

/// Shared bookkeeping for the fakes
#[derive(Debug, Default)]
struct Recorder {
    counter: AtomicU64,
    requests: Mutex<Vec<VendorRequest>>,
    failure: Mutex<Option<VendorError>>,
}

impl Recorder {
    fn call(&self, prefix: &str, case_id: &CaseId, action_id: &ActionId) -> Result<String, VendorError> {
        let failure = self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(err) = failure {
            return Err(err);
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = format!("{prefix}-{n}");
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(VendorRequest {
                case_id: case_id.clone(),
                action_id: action_id.clone(),
                reference: reference.clone(),
            });
        Ok(reference)
    }

    fn requests(&self) -> Vec<VendorRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn fail_with(&self, err: Option<VendorError>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = err;
    }
}

/// KYC vendor that accepts every request; references are `kyc-1`, `kyc-2`, ...
#[derive(Debug, Default)]
pub struct FakeKycVendor {
    recorder: Recorder,
}

impl FakeKycVendor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<VendorRequest> {
        self.recorder.requests()
    }

    /// Make every following call fail with `err`, or succeed again with `None`
    pub fn fail_with(&self, err: Option<VendorError>) {
        self.recorder.fail_with(err);
    }
}

impl KycVendorClient for FakeKycVendor {
    fn request_verification(&self, case_id: &CaseId, action_id: &ActionId) -> Result<String, VendorError> {
        self.recorder.call("kyc", case_id, action_id)
    }
}

/// E-signature vendor; envelopes are `env-1`, `env-2`, ...
#[derive(Debug, Default)]
pub struct FakeDocuSign {
    recorder: Recorder,
}

impl FakeDocuSign {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<VendorRequest> {
        self.recorder.requests()
    }

    pub fn fail_with(&self, err: Option<VendorError>) {
        self.recorder.fail_with(err);
    }
}

impl DocuSignClient for FakeDocuSign {
    fn send_envelope(&self, case_id: &CaseId, action_id: &ActionId) -> Result<String, VendorError> {
        self.recorder.call("env", case_id, action_id)
    }
}

/// Infrastructure API that provisions immediately unless told to queue
#[derive(Debug, Default)]
pub struct FakeInfrastructure {
    recorder: Recorder,
    queue: Mutex<bool>,
}

impl FakeInfrastructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue requests instead of provisioning them synchronously
    pub fn queued() -> Self {
        let api = Self::default();
        api.set_queued(true);
        api
    }

    pub fn set_queued(&self, queued: bool) {
        *self.queue.lock().unwrap_or_else(|e| e.into_inner()) = queued;
    }

    pub fn requests(&self) -> Vec<VendorRequest> {
        self.recorder.requests()
    }

    pub fn fail_with(&self, err: Option<VendorError>) {
        self.recorder.fail_with(err);
    }
}

impl InfrastructureApi for FakeInfrastructure {
    fn provision(&self, case_id: &CaseId, action_id: &ActionId) -> Result<ProvisioningResult, VendorError> {
        let queued = *self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queued {
            let request_id = self.recorder.call("prov", case_id, action_id)?;
            Ok(ProvisioningResult::Queued { request_id })
        } else {
            let environment_id = self.recorder.call("envt", case_id, action_id)?;
            Ok(ProvisioningResult::Ready { environment_id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (CaseId, ActionId) {
        (CaseId::new("c1"), ActionId::new("c1_kyc-1"))
    }

    #[test]
    fn test_fake_kyc_records_requests() {
        let vendor = FakeKycVendor::new();
        let (case_id, action_id) = ids();
        assert_eq!(vendor.request_verification(&case_id, &action_id).unwrap(), "kyc-1");
        assert_eq!(vendor.request_verification(&case_id, &action_id).unwrap(), "kyc-2");
        let requests = vendor.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].reference, "kyc-2");
    }

    #[test]
    fn test_fake_failure_is_sticky_until_cleared() {
        let vendor = FakeDocuSign::new();
        let (case_id, action_id) = ids();
        vendor.fail_with(Some(VendorError::unavailable(DOCUSIGN_VENDOR, "timeout")));
        assert!(vendor.send_envelope(&case_id, &action_id).is_err());
        assert!(vendor.send_envelope(&case_id, &action_id).is_err());
        vendor.fail_with(None);
        assert_eq!(vendor.send_envelope(&case_id, &action_id).unwrap(), "env-1");
        assert_eq!(vendor.requests().len(), 1);
    }

    #[test]
    fn test_fake_infrastructure_modes() {
        let api = FakeInfrastructure::new();
        let (case_id, action_id) = ids();
        assert!(matches!(
            api.provision(&case_id, &action_id).unwrap(),
            ProvisioningResult::Ready { .. }
        ));
        api.set_queued(true);
        assert_eq!(
            api.provision(&case_id, &action_id).unwrap(),
            ProvisioningResult::Queued {
                request_id: "prov-2".into()
            }
        );
    }

    #[test]
    fn test_vendor_error_display() {
        let err = VendorError::refused(KYC_VENDOR, "unsupported jurisdiction");
        assert_eq!(
            err.to_string(),
            "kyc_provider refused the request: unsupported jurisdiction"
        );
    }
}
