//! Wiring an activity service for onboarding

use crate::handlers::{ContractSigningHandler, EnvProvisioningHandler, KycVerificationHandler};
use crate::vendors::{
    DocuSignClient, FakeDocuSign, FakeInfrastructure, FakeKycVendor, InfrastructureApi,
    KycVendorClient,
};
use crate::ScenarioResolver;
use activity_engine::{ActivityService, CallbackConfig};
use activity_types::ActivityResult;
use std::sync::Arc;

/// The vendor clients the onboarding handlers call
#[derive(Clone)]
pub struct OnboardingVendors {
    pub kyc: Arc<dyn KycVendorClient>,
    pub docusign: Arc<dyn DocuSignClient>,
    pub infrastructure: Arc<dyn InfrastructureApi>,
}

impl OnboardingVendors {
    /// In-memory fakes for every vendor
    pub fn fakes() -> Self {
        Self {
            kyc: Arc::new(FakeKycVendor::new()),
            docusign: Arc::new(FakeDocuSign::new()),
            infrastructure: Arc::new(FakeInfrastructure::new()),
        }
    }
}

impl std::fmt::Debug for OnboardingVendors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnboardingVendors").finish_non_exhaustive()
    }
}

/// Register the onboarding scenarios and vendor handlers on a service
pub fn install(
    service: &mut ActivityService,
    vendors: &OnboardingVendors,
    callbacks: &CallbackConfig,
) -> ActivityResult<()> {
    for scenario in ScenarioResolver.all() {
        service.register_scenario(scenario)?;
    }
    service.register_handler(Box::new(KycVerificationHandler::new(vendors.kyc.clone(), callbacks)));
    service.register_handler(Box::new(ContractSigningHandler::new(
        vendors.docusign.clone(),
        callbacks,
    )));
    service.register_handler(Box::new(EnvProvisioningHandler::new(
        vendors.infrastructure.clone(),
        callbacks,
    )));

    tracing::info!(
        scenarios = service.scenarios().count(),
        handlers = service.dispatcher().count(),
        "Onboarding installed"
    );
    Ok(())
}
