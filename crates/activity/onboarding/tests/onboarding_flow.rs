//! Integration tests: onboarding cases driven end to end through the engine.

use activity_engine::*;
use activity_onboarding::*;
use activity_types::*;
use chrono::{Duration, Utc};
use std::sync::Arc;

struct Harness {
    service: ActivityService,
    clock: Arc<FixedClock>,
    kyc: Arc<FakeKycVendor>,
    infrastructure: Arc<FakeInfrastructure>,
}

impl Harness {
    fn new() -> Self {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let kyc = Arc::new(FakeKycVendor::new());
        let infrastructure = Arc::new(FakeInfrastructure::new());
        let vendors = OnboardingVendors {
            kyc: kyc.clone(),
            docusign: Arc::new(FakeDocuSign::new()),
            infrastructure: infrastructure.clone(),
        };

        let mut service = ActivityService::new()
            .with_ids(Arc::new(SequentialIdGenerator::new()))
            .with_clock(clock.clone());
        install(&mut service, &vendors, &CallbackConfig::default()).unwrap();

        Self {
            service,
            clock,
            kyc,
            infrastructure,
        }
    }

    fn open(&mut self, id: &str, client_type: ClientType) -> CaseId {
        let case_id = CaseId::new(id);
        let scenario = ScenarioResolver.scenario_code(client_type);
        self.service
            .start_case(case_id.clone(), "ACME Sp. z o.o.", &scenario)
            .unwrap();
        case_id
    }

    fn start(&mut self, case_id: &CaseId, stage: &str, step: &str) -> CommandOutcome {
        self.service
            .start_step(case_id, &StageCode::new(stage), &StepCode::new(step))
            .unwrap()
    }

    fn complete(&mut self, case_id: &CaseId, stage: &str, step: &str, code: &str) -> CommandOutcome {
        self.service
            .handle(Command::CompleteStep {
                case_id: case_id.clone(),
                stage_code: StageCode::new(stage),
                step_code: StepCode::new(step),
                outcome_code: code.into(),
                description: code.into(),
                reason: None,
                approver: Some(PartySignature::new("ops-1", "onboarding_officer")),
            })
            .unwrap()
    }

    fn webhook(&mut self, vendor: &str, reference: &str, status: &str) -> ActivityResult<CommandOutcome> {
        let command = VendorPayload::new(status).into_command(vendor, Some(reference))?;
        self.service.handle(command)
    }

    fn reference(outcome: &CommandOutcome) -> String {
        outcome
            .lifecycle
            .as_ref()
            .and_then(|l| l.external_reference())
            .unwrap()
            .to_string()
    }
}

fn summary(events: &[ActivityEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|e| e.name())
        .filter(|name| *name != "outcome_directive_dispatched")
        .collect()
}

#[test]
fn test_enterprise_happy_path() {
    let mut h = Harness::new();
    let case_id = h.open("ent-1", ClientType::Enterprise);
    let mut events = Vec::new();

    let started = h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION);
    let kyc_ref = Harness::reference(&started);
    events.extend(h.webhook(KYC_VENDOR, &kyc_ref, "verified").unwrap().events);

    let started = h.start(&case_id, "contract", steps::CONTRACT_SIGNING);
    let envelope = Harness::reference(&started);
    events.extend(h.webhook(DOCUSIGN_VENDOR, &envelope, "completed").unwrap().events);

    let started = h.start(&case_id, "provisioning", steps::ENV_PROVISIONING);
    assert!(started.lifecycle.as_ref().unwrap().is_completed());
    events.extend(h.complete(&case_id, "provisioning", steps::ENV_PROVISIONING, "provisioned").events);

    h.start(&case_id, "activation", steps::ACCOUNT_ACTIVATION);
    let last = h.complete(&case_id, "activation", steps::ACCOUNT_ACTIVATION, "activated");
    events.extend(last.events);

    assert_eq!(last.case_state, CaseState::Completed);
    assert_eq!(
        summary(&events),
        vec![
            "step_completed",
            "stage_advanced",
            "step_completed",
            "stage_advanced",
            "step_completed",
            "stage_advanced",
            "step_completed",
            "process_completed",
        ]
    );

    let case = h.service.case(&case_id).unwrap();
    let kyc = case
        .find_action(&StageCode::new("kyc"), &StepCode::new(steps::KYC_DOC_VERIFICATION))
        .unwrap();
    assert_eq!(kyc.approvers()[0].party_id, "vendor:kyc_provider");
    assert_eq!(kyc.approvers()[0].role, PartySignature::EXTERNAL_VERIFIER);
    assert!(h
        .service
        .callbacks()
        .find_overdue(h.clock.now() + Duration::days(30))
        .is_empty());
}

#[test]
fn test_kyc_rejection_fails_case() {
    let mut h = Harness::new();
    let case_id = h.open("ent-2", ClientType::Enterprise);
    let kyc_ref = Harness::reference(&h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION));

    let outcome = h.webhook(KYC_VENDOR, &kyc_ref, "rejected").unwrap();
    assert_eq!(outcome.case_state, CaseState::Failed);
    assert_eq!(outcome.directives, vec![OutcomeDirective::fail_process("KYC failed")]);
    assert!(!summary(&outcome.events).contains(&"stage_advanced"));

    let case = h.service.case(&case_id).unwrap();
    assert_eq!(case.current_stage().unwrap().stage_code(), &StageCode::new("kyc"));
}

#[test]
fn test_suspicious_kyc_escalates() {
    let mut h = Harness::new();
    let case_id = h.open("ent-3", ClientType::Enterprise);
    let kyc_ref = Harness::reference(&h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION));
    let outcome = h.webhook(KYC_VENDOR, &kyc_ref, "suspicious").unwrap();
    assert_eq!(outcome.case_state, CaseState::Escalated);
}

#[test]
fn test_duplicate_and_unknown_callbacks_change_nothing() {
    let mut h = Harness::new();
    let case_id = h.open("ent-4", ClientType::Enterprise);
    let kyc_ref = Harness::reference(&h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION));
    h.webhook(KYC_VENDOR, &kyc_ref, "verified").unwrap();
    let before = h.service.case(&case_id).unwrap();

    let err = h.webhook(KYC_VENDOR, &kyc_ref, "verified").unwrap_err();
    assert_eq!(err, ActivityError::NoPendingCallback(kyc_ref));
    let err = h.webhook(KYC_VENDOR, "kyc-999", "verified").unwrap_err();
    assert_eq!(err, ActivityError::NoPendingCallback("kyc-999".into()));

    assert_eq!(h.service.case(&case_id).unwrap(), before);
}

#[test]
fn test_kyc_supplement_retries_with_new_request() {
    let mut h = Harness::new();
    let case_id = h.open("ent-5", ClientType::Enterprise);
    let (stage, step) = (StageCode::new("kyc"), StepCode::new(steps::KYC_DOC_VERIFICATION));

    let first = Harness::reference(&h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION));
    let outcome = h.webhook(KYC_VENDOR, &first, "needs_info").unwrap();
    assert_eq!(
        outcome.directives,
        vec![OutcomeDirective::retry_step(steps::KYC_DOC_VERIFICATION)]
    );

    h.service.retry_step(&case_id, &stage, &step).unwrap();
    let second = Harness::reference(&h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION));
    assert_ne!(first, second);
    assert_eq!(h.kyc.requests().len(), 2);

    let outcome = h.webhook(KYC_VENDOR, &second, "verified").unwrap();
    assert!(summary(&outcome.events).contains(&"stage_advanced"));
}

#[test]
fn test_late_result_for_manually_settled_kyc_is_ignored() {
    let mut h = Harness::new();
    let case_id = h.open("ent-11", ClientType::Enterprise);
    let (stage, step) = (StageCode::new("kyc"), StepCode::new(steps::KYC_DOC_VERIFICATION));

    let first = Harness::reference(&h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION));
    let first_action = h.service.case(&case_id).unwrap().find_action(&stage, &step).unwrap().id().clone();
    h.complete(&case_id, "kyc", steps::KYC_DOC_VERIFICATION, "needs_supplement");
    assert!(h.service.callbacks().find_by_action_id(&first_action).unwrap().resolved);

    h.service.retry_step(&case_id, &stage, &step).unwrap();
    let second = Harness::reference(&h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION));
    assert_ne!(first, second);
    let before = h.service.case(&case_id).unwrap();

    let err = h.webhook(KYC_VENDOR, &first, "verified").unwrap_err();
    assert_eq!(err, ActivityError::NoPendingCallback(first.clone()));

    let case = h.service.case(&case_id).unwrap();
    assert_eq!(case, before);
    assert_eq!(case.find_action(&stage, &step).unwrap().state(), ActionState::InProgress);
    assert_eq!(case.current_stage().unwrap().stage_code(), &stage);
    assert!(h.service.callbacks().find_by_external_reference(&second).is_some());

    let outcome = h.webhook(KYC_VENDOR, &second, "verified").unwrap();
    assert!(summary(&outcome.events).contains(&"stage_advanced"));
    assert!(h
        .service
        .callbacks()
        .find_overdue(h.clock.now() + Duration::days(30))
        .is_empty());
}

#[test]
fn test_refused_kyc_fails_step_until_retried() {
    let mut h = Harness::new();
    let case_id = h.open("ent-6", ClientType::Enterprise);
    let (stage, step) = (StageCode::new("kyc"), StepCode::new(steps::KYC_DOC_VERIFICATION));

    h.kyc
        .fail_with(Some(VendorError::refused(KYC_VENDOR, "unsupported jurisdiction")));
    let outcome = h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION);
    assert!(outcome.lifecycle.unwrap().is_failed());
    let case = h.service.case(&case_id).unwrap();
    assert_eq!(case.find_action(&stage, &step).unwrap().state(), ActionState::Failed);

    h.kyc.fail_with(None);
    h.service.retry_step(&case_id, &stage, &step).unwrap();
    let outcome = h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION);
    let kyc_ref = Harness::reference(&outcome);

    let outcome = h.webhook(KYC_VENDOR, &kyc_ref, "verified").unwrap();
    assert!(summary(&outcome.events).contains(&"stage_advanced"));
}

#[test]
fn test_unreachable_vendor_aborts_start() {
    let mut h = Harness::new();
    let case_id = h.open("ent-7", ClientType::Enterprise);
    let before = h.service.case(&case_id).unwrap();

    h.kyc
        .fail_with(Some(VendorError::unavailable(KYC_VENDOR, "connection reset")));
    let err = h
        .service
        .start_step(&case_id, &StageCode::new("kyc"), &StepCode::new(steps::KYC_DOC_VERIFICATION))
        .unwrap_err();
    assert!(matches!(err, ActivityError::Lifecycle(_)));
    assert_eq!(h.service.case(&case_id).unwrap(), before);
}

#[test]
fn test_queued_provisioning_round_trip() {
    let mut h = Harness::new();
    let case_id = h.open("ent-8", ClientType::Enterprise);
    h.infrastructure.set_queued(true);

    let kyc_ref = Harness::reference(&h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION));
    h.webhook(KYC_VENDOR, &kyc_ref, "verified").unwrap();
    let envelope = Harness::reference(&h.start(&case_id, "contract", steps::CONTRACT_SIGNING));
    h.webhook(DOCUSIGN_VENDOR, &envelope, "completed").unwrap();

    let request = Harness::reference(&h.start(&case_id, "provisioning", steps::ENV_PROVISIONING));
    let outcome = h.webhook(INFRASTRUCTURE_VENDOR, &request, "failed").unwrap();
    assert_eq!(
        outcome.directives,
        vec![OutcomeDirective::retry_step(steps::ENV_PROVISIONING)]
    );

    h.service
        .retry_step(
            &case_id,
            &StageCode::new("provisioning"),
            &StepCode::new(steps::ENV_PROVISIONING),
        )
        .unwrap();
    let request = Harness::reference(&h.start(&case_id, "provisioning", steps::ENV_PROVISIONING));
    h.webhook(INFRASTRUCTURE_VENDOR, &request, "provisioned").unwrap();

    let case = h.service.case(&case_id).unwrap();
    assert_eq!(case.current_stage().unwrap().stage_code(), &StageCode::new("activation"));
}

#[test]
fn test_callback_from_wrong_vendor_is_rejected() {
    let mut h = Harness::new();
    let case_id = h.open("ent-9", ClientType::Enterprise);
    let kyc_ref = Harness::reference(&h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION));

    let err = h.webhook(DOCUSIGN_VENDOR, &kyc_ref, "completed").unwrap_err();
    assert_eq!(
        err,
        ActivityError::VendorMismatch {
            expected: KYC_VENDOR.into(),
            actual: DOCUSIGN_VENDOR.into(),
        }
    );
}

#[test]
fn test_overdue_kyc_is_reported_for_escalation() {
    let mut h = Harness::new();
    let case_id = h.open("ent-10", ClientType::Enterprise);
    h.start(&case_id, "kyc", steps::KYC_DOC_VERIFICATION);

    h.clock.advance(Duration::hours(24));
    assert!(h.service.overdue_callbacks().is_empty());

    h.clock.advance(Duration::days(6));
    let overdue = h.service.overdue_callbacks();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].case_id, case_id);

    let kyc_days = (h.clock.now() - overdue[0].created_at).num_days();
    assert!(KycEscalationRule::default().should_escalate(ClientType::Enterprise, kyc_days));
}

#[test]
fn test_sme_path() {
    let mut h = Harness::new();
    let case_id = h.open("sme-1", ClientType::Sme);

    let started = h.start(&case_id, "kyc", steps::AUTO_KYC);
    assert_eq!(
        started.lifecycle,
        Some(LifecycleResult::completed("no lifecycle handler"))
    );
    let outcome = h.complete(&case_id, "kyc", steps::AUTO_KYC, "accepted");
    assert_eq!(summary(&outcome.events), vec!["step_completed", "stage_advanced"]);

    h.start(&case_id, "activation", steps::ACCOUNT_ACTIVATION);
    let outcome = h.complete(&case_id, "activation", steps::ACCOUNT_ACTIVATION, "activated");
    assert_eq!(outcome.case_state, CaseState::Completed);
    assert!(h.kyc.requests().is_empty());
}
