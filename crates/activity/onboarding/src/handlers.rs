//! Lifecycle handlers that call onboarding vendors when a step starts
//!
//! Each handler fires on the Pending to InProgress transition of its step.
//! A vendor that cannot be reached is an infrastructure error and aborts
//! the command; a vendor that refuses the request fails the step.

use crate::vendors::*;
use crate::steps;
use activity_engine::{ActionLifecycleHandler, CallbackConfig, LifecycleContext, PendingCallbackLedger};
use activity_types::*;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;

fn starts(step_code: &StepCode, expected: &str, from: ActionState, to: ActionState) -> bool {
    step_code.as_str() == expected && from == ActionState::Pending && to == ActionState::InProgress
}

fn vendor_failure(err: VendorError) -> ActivityResult<LifecycleResult> {
    match err {
        VendorError::Unavailable { .. } => Err(ActivityError::Lifecycle(err.to_string())),
        VendorError::Refused { .. } => Ok(LifecycleResult::failed(err.to_string())),
    }
}

fn await_vendor(
    ctx: &LifecycleContext<'_>,
    callbacks: &mut dyn PendingCallbackLedger,
    reference: String,
    vendor: &str,
    wait: Duration,
) -> ActivityResult<LifecycleResult> {
    callbacks.store(ctx.pending_callback(reference.clone(), vendor, wait))?;
    Ok(LifecycleResult::awaiting_callback(reference))
}

// ── KYC ──────────────────────────────────────────────────────────────

/// Sends company documents to the KYC provider
pub struct KycVerificationHandler {
    client: Arc<dyn KycVendorClient>,
    deadline: Duration,
}

impl KycVerificationHandler {
    pub fn new(client: Arc<dyn KycVendorClient>, config: &CallbackConfig) -> Self {
        Self {
            client,
            deadline: config.kyc_deadline(),
        }
    }
}

impl ActionLifecycleHandler for KycVerificationHandler {
    fn name(&self) -> &str {
        "kyc_verification"
    }

    fn supports(&self, action_type: &StepCode, from: ActionState, to: ActionState) -> bool {
        starts(action_type, steps::KYC_DOC_VERIFICATION, from, to)
    }

    fn handle(
        &self,
        ctx: &LifecycleContext<'_>,
        callbacks: &mut dyn PendingCallbackLedger,
    ) -> ActivityResult<LifecycleResult> {
        match self.client.request_verification(ctx.case_id, ctx.action.id()) {
            Ok(reference) => await_vendor(ctx, callbacks, reference, KYC_VENDOR, self.deadline),
            Err(err) => vendor_failure(err),
        }
    }
}

// ── Contract ─────────────────────────────────────────────────────────

/// Sends the service agreement out for signature
pub struct ContractSigningHandler {
    client: Arc<dyn DocuSignClient>,
    deadline: Duration,
}

impl ContractSigningHandler {
    pub fn new(client: Arc<dyn DocuSignClient>, config: &CallbackConfig) -> Self {
        Self {
            client,
            deadline: config.contract_deadline(),
        }
    }
}

impl ActionLifecycleHandler for ContractSigningHandler {
    fn name(&self) -> &str {
        "contract_signing"
    }

    fn supports(&self, action_type: &StepCode, from: ActionState, to: ActionState) -> bool {
        starts(action_type, steps::CONTRACT_SIGNING, from, to)
    }

    fn handle(
        &self,
        ctx: &LifecycleContext<'_>,
        callbacks: &mut dyn PendingCallbackLedger,
    ) -> ActivityResult<LifecycleResult> {
        match self.client.send_envelope(ctx.case_id, ctx.action.id()) {
            Ok(envelope) => await_vendor(ctx, callbacks, envelope, DOCUSIGN_VENDOR, self.deadline),
            Err(err) => vendor_failure(err),
        }
    }
}

// ── Provisioning ─────────────────────────────────────────────────────

/// Provisions the client environment
///
/// A synchronous provision completes the side effect and reports the
/// environment id in the result metadata. A queued one waits for the
/// infrastructure callback.
pub struct EnvProvisioningHandler {
    api: Arc<dyn InfrastructureApi>,
    deadline: Duration,
}

impl EnvProvisioningHandler {
    pub fn new(api: Arc<dyn InfrastructureApi>, config: &CallbackConfig) -> Self {
        Self {
            api,
            deadline: config.provisioning_deadline(),
        }
    }
}

impl ActionLifecycleHandler for EnvProvisioningHandler {
    fn name(&self) -> &str {
        "env_provisioning"
    }

    fn supports(&self, action_type: &StepCode, from: ActionState, to: ActionState) -> bool {
        starts(action_type, steps::ENV_PROVISIONING, from, to)
    }

    fn handle(
        &self,
        ctx: &LifecycleContext<'_>,
        callbacks: &mut dyn PendingCallbackLedger,
    ) -> ActivityResult<LifecycleResult> {
        match self.api.provision(ctx.case_id, ctx.action.id()) {
            Ok(ProvisioningResult::Ready { environment_id }) => {
                let metadata = HashMap::from([("environment_id".to_string(), environment_id)]);
                Ok(LifecycleResult::completed_with("environment provisioned", metadata))
            }
            Ok(ProvisioningResult::Queued { request_id }) => {
                await_vendor(ctx, callbacks, request_id, INFRASTRUCTURE_VENDOR, self.deadline)
            }
            Err(err) => vendor_failure(err),
        }
    }
}
