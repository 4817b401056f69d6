mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{session_with, FakeDirectory, FakeTickets, KNOWN_ACCOUNT};
use portal_wizard::{
    form::{
        AccessGrantEntry, AccessLevel, Acknowledgement, FormPatch, IssueCategory, RequestKind,
        StorageTier,
    },
    submit::{ReporterIdentity, SubmissionStatus},
    verify::Verification,
    wizard::{Flow, StepId},
    WizardError, WizardSession,
};

fn reporter() -> ReporterIdentity {
    ReporterIdentity::new("Dana Reyes", "dana@example.com")
}

fn acknowledge_all(session: &mut WizardSession, flow: Flow) {
    for ack in flow.checklist() {
        session.set_acknowledgement(*ack, true);
    }
}

/// Walks a storage request up to the confirmation step.
fn fill_storage_request(session: &mut WizardSession) {
    session.update(FormPatch {
        request_kind: Some(RequestKind::Storage),
        ..Default::default()
    });
    assert!(session.go_next());

    let mut slots = BTreeMap::new();
    slots.insert("primary".to_string(), "team-logs".to_string());
    session.update(FormPatch {
        storage_tier: Some(StorageTier::Archive),
        bucket_slots: Some(slots),
        bucket_notes: Some("team-exports\n\n".into()),
        ..Default::default()
    });
    assert!(session.go_next());

    session.update(FormPatch {
        retention_days: Some(Some(365)),
        versioning: Some(true),
        ..Default::default()
    });
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::Confirmation);
}

#[tokio::test(start_paused = true)]
async fn storage_request_skips_account_check_and_back_returns_to_type() {
    let directory = Arc::new(FakeDirectory::default());
    let mut session = session_with(Flow::Request, directory.clone(), Arc::default());

    session.update(FormPatch {
        request_kind: Some(RequestKind::Storage),
        ..Default::default()
    });
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::StorageTier);
    assert!(!session.controller().history().contains(&StepId::AwsAccount));

    assert!(session.go_back());
    assert_eq!(session.current_step(), StepId::RequestType);
    assert!(!session.go_back());
    assert!(directory.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_account_blocks_progress_until_a_valid_one_is_entered() {
    let directory = Arc::new(FakeDirectory::with_accounts(&[KNOWN_ACCOUNT]));
    let mut session = session_with(Flow::Request, directory.clone(), Arc::default());

    session.update(FormPatch {
        request_kind: Some(RequestKind::AccessChange),
        ..Default::default()
    });
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::AwsAccount);

    session.update(FormPatch {
        aws_account_id: Some("000000000000".into()),
        ..Default::default()
    });
    assert!(!session.go_next(), "pending check must block navigation");
    assert_eq!(session.settle_verification().await, Verification::Invalid);
    assert!(!session.go_next());
    assert_eq!(
        session.view().validation.verification,
        Some(Verification::Invalid)
    );

    session.update(FormPatch {
        aws_account_id: Some(KNOWN_ACCOUNT.into()),
        ..Default::default()
    });
    assert_eq!(session.poll_verification(), Verification::Unknown);
    assert_eq!(session.settle_verification().await, Verification::Valid);
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::AccessGrants);
    assert_eq!(directory.calls(), vec!["000000000000", KNOWN_ACCOUNT]);
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_issue_a_single_lookup() {
    let directory = Arc::new(FakeDirectory::with_accounts(&[KNOWN_ACCOUNT]));
    let mut session = session_with(Flow::Request, directory.clone(), Arc::default());
    session.update(FormPatch {
        request_kind: Some(RequestKind::AccessChange),
        ..Default::default()
    });
    assert!(session.go_next());

    for partial in ["1", "1234", "12345678", KNOWN_ACCOUNT] {
        session.update(FormPatch {
            aws_account_id: Some(partial.into()),
            ..Default::default()
        });
    }
    assert!(session.verification_pending());
    assert_eq!(session.settle_verification().await, Verification::Valid);
    assert_eq!(directory.calls(), vec![KNOWN_ACCOUNT]);
}

#[tokio::test(start_paused = true)]
async fn successful_submission_lands_on_success_with_ticket() {
    let tickets = Arc::new(FakeTickets::default());
    let mut session = session_with(Flow::Request, Arc::default(), tickets.clone());
    fill_storage_request(&mut session);

    let early = session.submit(&reporter()).await;
    assert!(matches!(early, Err(WizardError::StepIncomplete { .. })));
    assert!(tickets.payloads().is_empty());

    acknowledge_all(&mut session, Flow::Request);
    let receipt = session.submit(&reporter()).await.expect("submission succeeds");
    assert_eq!(receipt.ticket_id, "TCK-1");

    assert_eq!(session.current_step(), StepId::Success);
    assert!(session.controller().history().is_empty());
    assert!(session.controller().is_finished());
    assert_eq!(
        session.controller().submission(),
        &SubmissionStatus::Succeeded {
            ticket_id: "TCK-1".into()
        }
    );
    assert_eq!(session.controller().form().request_kind, None);
    assert!(!session.go_back());

    let payloads = tickets.payloads();
    assert_eq!(payloads.len(), 1);
    let payload = &payloads[0];
    assert_eq!(payload.request_kind(), Some(RequestKind::Storage));
    assert_eq!(payload.reporter(), &reporter());
    let names: Vec<_> = payload
        .resources()
        .iter()
        .map(|entry| (entry.alias.as_str(), entry.name.as_str()))
        .collect();
    assert_eq!(names, vec![("primary", "team-logs"), ("extra-1", "team-exports")]);
    assert_eq!(payload.storage().map(|storage| storage.tier), Some(StorageTier::Archive));
    assert_eq!(payload.lifecycle().map(|lifecycle| lifecycle.retention_days), Some(365));
    assert!(payload.aws_account_id().is_none());
}

#[tokio::test(start_paused = true)]
async fn failed_submission_keeps_everything_and_retry_succeeds() {
    let tickets = Arc::new(FakeTickets::failing(1));
    let mut session = session_with(Flow::Request, Arc::default(), tickets.clone());
    fill_storage_request(&mut session);
    acknowledge_all(&mut session, Flow::Request);
    let history_before = session.controller().history().to_vec();

    let err = session.submit(&reporter()).await.unwrap_err();
    assert!(matches!(err, WizardError::Rejected { status: 503, .. }));
    assert_eq!(session.current_step(), StepId::Confirmation);
    assert_eq!(session.controller().history(), history_before.as_slice());
    assert_eq!(session.controller().form().storage_tier, Some(StorageTier::Archive));
    assert!(matches!(
        session.controller().submission(),
        SubmissionStatus::Failed { message } if message.contains("ticketing unavailable")
    ));

    let receipt = session.submit(&reporter()).await.expect("retry succeeds");
    assert_eq!(receipt.ticket_id, "TCK-2");
    assert_eq!(session.current_step(), StepId::Success);
    assert_eq!(tickets.payloads().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn submit_before_confirmation_is_rejected() {
    let tickets = Arc::new(FakeTickets::default());
    let mut session = session_with(Flow::Request, Arc::default(), tickets.clone());

    let err = session.submit(&reporter()).await.unwrap_err();
    assert!(matches!(err, WizardError::NotAtConfirmation(StepId::RequestType)));
    assert!(tickets.payloads().is_empty());
}

#[tokio::test(start_paused = true)]
async fn new_account_request_collects_owner_and_grants() {
    let tickets = Arc::new(FakeTickets::default());
    let mut session = session_with(Flow::Request, Arc::default(), tickets.clone());

    session.update(FormPatch {
        request_kind: Some(RequestKind::NewAccount),
        ..Default::default()
    });
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::AccountSetup);

    session.update(FormPatch {
        account_name: Some("analytics-prod".into()),
        owner_name: Some("Dana Reyes".into()),
        ..Default::default()
    });
    assert!(!session.go_next(), "owner email is still missing");
    session.update(FormPatch {
        owner_email: Some("dana@example.com".into()),
        ..Default::default()
    });
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::AccessGrants);

    assert!(!session.go_next(), "at least one grant is required");
    let index = session
        .add_access_grant(AccessGrantEntry::new("Sam Lee", "", AccessLevel::ReadWrite))
        .expect("row added");
    assert!(!session.go_next(), "incomplete rows block the step");
    assert!(session.remove_access_grant(index).is_some());
    session.add_access_grant(AccessGrantEntry::new(
        "Sam Lee",
        "sam@example.com",
        AccessLevel::ReadWrite,
    ));
    assert!(session.go_next());

    acknowledge_all(&mut session, Flow::Request);
    session.submit(&reporter()).await.expect("submission succeeds");

    let payload = &tickets.payloads()[0];
    let account = payload.new_account().expect("new account section");
    assert_eq!(account.account_name, "analytics-prod");
    assert_eq!(account.cost_center, None);
    assert_eq!(payload.access_grants().len(), 1);
    assert_eq!(payload.access_grants()[0].access_level, AccessLevel::ReadWrite);
}

#[tokio::test(start_paused = true)]
async fn account_access_issue_verifies_then_reports() {
    let directory = Arc::new(FakeDirectory::with_accounts(&[KNOWN_ACCOUNT]));
    let tickets = Arc::new(FakeTickets::default());
    let mut session = session_with(Flow::IssueReport, directory.clone(), tickets.clone());
    assert_eq!(session.current_step(), StepId::IssueCategory);

    session.update(FormPatch {
        issue_category: Some(IssueCategory::AccountAccess),
        ..Default::default()
    });
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::AwsAccount);

    session.update(FormPatch {
        aws_account_id: Some(format!(" {KNOWN_ACCOUNT} ")),
        ..Default::default()
    });
    assert_eq!(session.settle_verification().await, Verification::Valid);
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::IssueDetails);

    session.update(FormPatch {
        issue_description: Some("Console login loops back to the sign-in page.".into()),
        attachment_ref: Some(Some("screenshot-42".into())),
        ..Default::default()
    });
    assert!(session.go_next());
    assert_eq!(session.view().step_number, 4);

    session.set_acknowledgement(Acknowledgement::DetailsAccurate, true);
    let receipt = session.submit(&reporter()).await.expect("issue reported");
    assert_eq!(receipt.ticket_id, "TCK-1");

    let payload = &tickets.payloads()[0];
    assert_eq!(payload.flow(), Flow::IssueReport);
    assert_eq!(payload.aws_account_id(), Some(KNOWN_ACCOUNT));
    let issue = payload.issue().expect("issue section");
    assert_eq!(issue.category, IssueCategory::AccountAccess);
    assert_eq!(issue.attachment_ref.as_deref(), Some("screenshot-42"));
    assert_eq!(payload.acknowledgements(), &[Acknowledgement::DetailsAccurate]);
}

#[tokio::test(start_paused = true)]
async fn billing_issue_goes_straight_to_details() {
    let directory = Arc::new(FakeDirectory::default());
    let mut session = session_with(Flow::IssueReport, directory.clone(), Arc::default());

    session.update(FormPatch {
        issue_category: Some(IssueCategory::Billing),
        ..Default::default()
    });
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::IssueDetails);

    assert!(session.jump_to_step(StepId::AwsAccount));
    assert!(session.go_back());
    assert_eq!(session.current_step(), StepId::IssueDetails);
    assert!(!session.jump_to_step(StepId::Success));
    assert!(directory.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn account_changed_on_confirmation_must_be_verified_again() {
    let directory = Arc::new(FakeDirectory::with_accounts(&[KNOWN_ACCOUNT]));
    let tickets = Arc::new(FakeTickets::default());
    let mut session = session_with(Flow::Request, directory.clone(), tickets.clone());

    session.update(FormPatch {
        request_kind: Some(RequestKind::AccessChange),
        aws_account_id: Some(KNOWN_ACCOUNT.into()),
        ..Default::default()
    });
    assert!(session.go_next());
    assert_eq!(session.settle_verification().await, Verification::Valid);
    assert!(session.go_next());
    session.add_access_grant(AccessGrantEntry::new(
        "Sam Lee",
        "sam@example.com",
        AccessLevel::Read,
    ));
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::Confirmation);
    acknowledge_all(&mut session, Flow::Request);

    session.update(FormPatch {
        aws_account_id: Some("000000000000".into()),
        ..Default::default()
    });
    let err = session.submit(&reporter()).await.unwrap_err();
    assert!(matches!(err, WizardError::StepIncomplete { step: StepId::AwsAccount, .. }));

    assert_eq!(session.settle_verification().await, Verification::Invalid);
    let err = session.submit(&reporter()).await.unwrap_err();
    assert!(matches!(err, WizardError::StepIncomplete { step: StepId::AwsAccount, .. }));
    assert!(tickets.payloads().is_empty());
    assert_eq!(session.current_step(), StepId::Confirmation);

    session.update(FormPatch {
        aws_account_id: Some(KNOWN_ACCOUNT.into()),
        ..Default::default()
    });
    assert_eq!(session.settle_verification().await, Verification::Valid);
    let receipt = session.submit(&reporter()).await.expect("verified account submits");
    assert_eq!(receipt.ticket_id, "TCK-1");
    assert_eq!(tickets.payloads()[0].aws_account_id(), Some(KNOWN_ACCOUNT));
}

#[tokio::test(start_paused = true)]
async fn jump_to_confirmation_cannot_send_an_empty_request() {
    let tickets = Arc::new(FakeTickets::default());
    let mut session = session_with(Flow::Request, Arc::default(), tickets.clone());

    assert!(session.jump_to_step(StepId::Confirmation));
    acknowledge_all(&mut session, Flow::Request);

    let err = session.submit(&reporter()).await.unwrap_err();
    assert!(matches!(err, WizardError::StepIncomplete { step: StepId::RequestType, .. }));
    assert!(tickets.payloads().is_empty());
    assert_eq!(session.controller().submission(), &SubmissionStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn revisited_grant_list_is_replaced_not_appended() {
    let mut session = session_with(Flow::Request, Arc::default(), Arc::default());
    session.update(FormPatch {
        request_kind: Some(RequestKind::NewAccount),
        account_name: Some("analytics-prod".into()),
        owner_name: Some("Dana Reyes".into()),
        owner_email: Some("dana@example.com".into()),
        ..Default::default()
    });
    assert!(session.go_next());
    assert!(session.go_next());
    assert_eq!(session.current_step(), StepId::AccessGrants);

    session.add_access_grant(AccessGrantEntry::new("Sam Lee", " ", AccessLevel::Read));
    assert!(!session.go_next());

    session.update(FormPatch {
        access_grants: Some(vec![
            AccessGrantEntry::new("Sam Lee", "sam@example.com", AccessLevel::Read),
            AccessGrantEntry::new("Ana Ito", "ana@example.com", AccessLevel::Write),
        ]),
        ..Default::default()
    });
    assert_eq!(session.controller().form().access_grants.len(), 2);
    assert!(session.go_next());

    assert!(session.go_back());
    session.update(FormPatch {
        access_grants: Some(vec![AccessGrantEntry::new(
            "Ana Ito",
            "ana@example.com",
            AccessLevel::ReadWrite,
        )]),
        ..Default::default()
    });
    let grants = &session.controller().form().access_grants;
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].access_level, AccessLevel::ReadWrite);
}
