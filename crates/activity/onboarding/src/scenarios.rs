//! Onboarding scenarios and the client-type resolver

use activity_types::*;
use serde::{Deserialize, Serialize};

pub const ENTERPRISE_ONBOARDING: &str = "enterprise_onboarding";
pub const SME_ONBOARDING: &str = "sme_onboarding";

/// Step codes the vendor handlers bind to
pub mod steps {
    pub const KYC_DOC_VERIFICATION: &str = "kyc_doc_verification";
    pub const AUTO_KYC: &str = "auto_kyc";
    pub const CONTRACT_SIGNING: &str = "contract_signing";
    pub const ENV_PROVISIONING: &str = "env_provisioning";
    pub const ACCOUNT_ACTIVATION: &str = "account_activation";
}

/// Kind of client being onboarded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Enterprise,
    Sme,
}

impl ClientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enterprise => "enterprise",
            Self::Sme => "sme",
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClientType {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enterprise" => Ok(Self::Enterprise),
            "sme" => Ok(Self::Sme),
            other => Err(ActivityError::ScenarioNotFound(other.to_string())),
        }
    }
}

/// Full enterprise path: document KYC, signed contract, a provisioned
/// environment, then activation.
pub fn enterprise_onboarding() -> ScenarioBlueprint {
    ScenarioBlueprint::new(
        ENTERPRISE_ONBOARDING,
        "Enterprise client onboarding",
        ConflictPolicyKind::EscalateOnConflict,
    )
    .with_stage(
        StageBlueprint::new("kyc", "Know your customer").with_step(
            StepBlueprint::new(steps::KYC_DOC_VERIFICATION, "Verify company documents")
                .with_outcome("accepted", "Documents verified", OutcomeDirective::advance_stage())
                .with_outcome(
                    "needs_supplement",
                    "Vendor needs more documents",
                    OutcomeDirective::retry_step(steps::KYC_DOC_VERIFICATION),
                )
                .with_outcome("rejected", "Verification rejected", OutcomeDirective::fail_process("KYC failed"))
                .with_outcome("suspicious", "Flagged as suspicious", OutcomeDirective::escalate()),
        ),
    )
    .with_stage(
        StageBlueprint::new("contract", "Contract").with_step(
            StepBlueprint::new(steps::CONTRACT_SIGNING, "Sign the service agreement")
                .with_outcome("signed", "Contract signed", OutcomeDirective::advance_stage())
                .with_outcome(
                    "declined",
                    "Contract declined",
                    OutcomeDirective::fail_process("Contract declined"),
                ),
        ),
    )
    .with_stage(
        StageBlueprint::new("provisioning", "Provisioning").with_step(
            StepBlueprint::new(steps::ENV_PROVISIONING, "Provision the client environment")
                .with_outcome("provisioned", "Environment ready", OutcomeDirective::advance_stage())
                .with_outcome(
                    "provisioning_failed",
                    "Provisioning failed",
                    OutcomeDirective::retry_step(steps::ENV_PROVISIONING),
                ),
        ),
    )
    .with_stage(activation_stage())
}

/// Short SME path: automated KYC then activation.
pub fn sme_onboarding() -> ScenarioBlueprint {
    ScenarioBlueprint::new(SME_ONBOARDING, "SME client onboarding", ConflictPolicyKind::TerminalWins)
        .with_stage(
            StageBlueprint::new("kyc", "Know your customer").with_step(
                StepBlueprint::new(steps::AUTO_KYC, "Automated KYC check")
                    .with_outcome("accepted", "Check passed", OutcomeDirective::advance_stage())
                    .with_outcome(
                        "rejected",
                        "Check failed",
                        OutcomeDirective::fail_process("Auto KYC failed"),
                    ),
            ),
        )
        .with_stage(activation_stage())
}

fn activation_stage() -> StageBlueprint {
    StageBlueprint::new("activation", "Activation").with_step(
        StepBlueprint::new(steps::ACCOUNT_ACTIVATION, "Activate the account")
            .with_outcome("activated", "Account active", OutcomeDirective::complete_process()),
    )
}

/// Picks the scenario for a client type
#[derive(Debug, Default, Clone, Copy)]
pub struct ScenarioResolver;

impl ScenarioResolver {
    pub fn resolve(&self, client_type: ClientType) -> ScenarioBlueprint {
        match client_type {
            ClientType::Enterprise => enterprise_onboarding(),
            ClientType::Sme => sme_onboarding(),
        }
    }

    /// Resolve from a raw client type, as received from a CRM
    pub fn resolve_str(&self, client_type: &str) -> ActivityResult<ScenarioBlueprint> {
        Ok(self.resolve(client_type.parse()?))
    }

    pub fn scenario_code(&self, client_type: ClientType) -> ScenarioCode {
        match client_type {
            ClientType::Enterprise => ScenarioCode::new(ENTERPRISE_ONBOARDING),
            ClientType::Sme => ScenarioCode::new(SME_ONBOARDING),
        }
    }

    /// Every onboarding scenario
    pub fn all(&self) -> Vec<ScenarioBlueprint> {
        vec![enterprise_onboarding(), sme_onboarding()]
    }
}
