//! Pure per-step validity checks.
//!
//! Nothing here is cached: views call [`is_step_valid`] on every edit and the
//! answer is always recomputed from the form.

use serde::Serialize;

use crate::form::{Acknowledgement, FormState};
use crate::verify::Verification;
use crate::wizard::steps::StepDefinition;

/// A field (or field group) a step can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    RequestKind,
    AccountName,
    OwnerName,
    OwnerEmail,
    AwsAccountId,
    /// At least one grant, every row with a name and an email.
    AccessGrants,
    StorageTier,
    /// At least one bucket, from a slot or a note line.
    Buckets,
    RetentionDays,
    ChangeDetails,
    IssueCategory,
    IssueDescription,
    Acknowledgement(Acknowledgement),
}

impl FieldKey {
    pub fn label(self) -> &'static str {
        match self {
            FieldKey::RequestKind => "Request type",
            FieldKey::AccountName => "Account name",
            FieldKey::OwnerName => "Owner name",
            FieldKey::OwnerEmail => "Owner email",
            FieldKey::AwsAccountId => "AWS account ID",
            FieldKey::AccessGrants => "Access grants",
            FieldKey::StorageTier => "Storage tier",
            FieldKey::Buckets => "Buckets",
            FieldKey::RetentionDays => "Retention (days)",
            FieldKey::ChangeDetails => "Change details",
            FieldKey::IssueCategory => "Issue category",
            FieldKey::IssueDescription => "Issue description",
            FieldKey::Acknowledgement(ack) => ack.label(),
        }
    }

    pub fn is_satisfied(self, form: &FormState) -> bool {
        match self {
            FieldKey::RequestKind => form.request_kind.is_some(),
            FieldKey::AccountName => filled(&form.account_name),
            FieldKey::OwnerName => filled(&form.owner_name),
            FieldKey::OwnerEmail => filled(&form.owner_email),
            FieldKey::AwsAccountId => filled(&form.aws_account_id),
            FieldKey::AccessGrants => {
                !form.access_grants.is_empty()
                    && form.access_grants.iter().all(|grant| grant.is_complete())
            }
            FieldKey::StorageTier => form.storage_tier.is_some(),
            FieldKey::Buckets => {
                form.bucket_slots.values().any(|name| filled(name))
                    || form.bucket_notes.lines().any(filled)
            }
            FieldKey::RetentionDays => form.retention_days.is_some_and(|days| days > 0),
            FieldKey::ChangeDetails => filled(&form.change_details),
            FieldKey::IssueCategory => form.issue_category.is_some(),
            FieldKey::IssueDescription => filled(&form.issue_description),
            FieldKey::Acknowledgement(ack) => form.acknowledgements.contains(&ack),
        }
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Why a step is (or is not) ready to be left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepValidation {
    pub missing: Vec<FieldKey>,
    /// Remote check state, present only for steps that require one.
    pub verification: Option<Verification>,
}

impl StepValidation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
            && self
                .verification
                .map_or(true, |status| status == Verification::Valid)
    }

    /// Comma separated labels of the missing fields.
    pub fn describe_missing(&self) -> String {
        self.missing
            .iter()
            .map(|field| field.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Missing fields plus an unverified remote check, for error messages.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(self.describe_missing());
        }
        match self.verification {
            Some(Verification::Unknown) => parts.push("account not verified".to_string()),
            Some(Verification::Invalid) => parts.push("account failed verification".to_string()),
            Some(Verification::Valid) | None => {}
        }
        parts.join("; ")
    }
}

pub fn validate_step(step: &StepDefinition, form: &FormState) -> StepValidation {
    let missing = step
        .required
        .iter()
        .copied()
        .filter(|field| !field.is_satisfied(form))
        .collect();
    let verification = step.remote_check.then(|| form.account_verification());
    StepValidation {
        missing,
        verification,
    }
}

pub fn is_step_valid(step: &StepDefinition, form: &FormState) -> bool {
    validate_step(step, form).is_valid()
}
