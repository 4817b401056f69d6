use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::form::types::{
    AccessGrantEntry, AccessGrantPatch, Acknowledgement, IssueCategory, RequestKind, StorageTier,
};
use crate::verify::Verification;

/// The shared record accumulating every field the wizard pages capture.
///
/// Fields are the union of all steps' fields. Steps only ever touch the
/// fields they own, so data entered early in a path survives untouched until
/// submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    pub request_kind: Option<RequestKind>,

    pub account_name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub cost_center: String,

    pub aws_account_id: String,

    pub access_grants: Vec<AccessGrantEntry>,

    pub storage_tier: Option<StorageTier>,
    /// Named bucket slots (slot alias -> bucket name).
    pub bucket_slots: BTreeMap<String, String>,
    /// Free text, one additional bucket per line.
    pub bucket_notes: String,

    pub retention_days: Option<u32>,
    pub archive_after_days: Option<u32>,
    pub versioning: bool,

    pub change_details: String,

    pub issue_category: Option<IssueCategory>,
    pub issue_description: String,
    pub attachment_ref: Option<String>,

    pub acknowledgements: BTreeSet<Acknowledgement>,

    #[serde(skip)]
    pub(crate) account_check: Option<AccountCheck>,
}

/// Verification result tagged with the identifier it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AccountCheck {
    value: String,
    status: Verification,
}

/// Partial update merged into [`FormState`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct FormPatch {
    pub request_kind: Option<RequestKind>,
    pub account_name: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub cost_center: Option<String>,
    pub aws_account_id: Option<String>,
    pub access_grants: Option<Vec<AccessGrantEntry>>,
    pub storage_tier: Option<StorageTier>,
    pub bucket_slots: Option<BTreeMap<String, String>>,
    pub bucket_notes: Option<String>,
    pub retention_days: Option<Option<u32>>,
    pub archive_after_days: Option<Option<u32>>,
    pub versioning: Option<bool>,
    pub change_details: Option<String>,
    pub issue_category: Option<IssueCategory>,
    pub issue_description: Option<String>,
    pub attachment_ref: Option<Option<String>>,
    pub acknowledgements: Option<BTreeSet<Acknowledgement>>,
}

/// What a merge changed that the caller may need to react to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormUpdate {
    /// The verified account identifier now holds a different (trimmed) value.
    pub identifier_changed: bool,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow merge: every `Some` in the patch replaces the stored field.
    pub fn merge(&mut self, patch: FormPatch) -> FormUpdate {
        let mut update = FormUpdate::default();

        if let Some(kind) = patch.request_kind {
            self.request_kind = Some(kind);
        }
        if let Some(value) = patch.account_name {
            self.account_name = value;
        }
        if let Some(value) = patch.owner_name {
            self.owner_name = value;
        }
        if let Some(value) = patch.owner_email {
            self.owner_email = value;
        }
        if let Some(value) = patch.cost_center {
            self.cost_center = value;
        }
        if let Some(value) = patch.aws_account_id {
            if value.trim() != self.aws_account_id.trim() {
                self.account_check = None;
                update.identifier_changed = true;
            }
            self.aws_account_id = value;
        }
        if let Some(grants) = patch.access_grants {
            self.access_grants = grants;
        }
        if let Some(tier) = patch.storage_tier {
            self.storage_tier = Some(tier);
        }
        if let Some(slots) = patch.bucket_slots {
            self.bucket_slots = slots;
        }
        if let Some(notes) = patch.bucket_notes {
            self.bucket_notes = notes;
        }
        if let Some(days) = patch.retention_days {
            self.retention_days = days;
        }
        if let Some(days) = patch.archive_after_days {
            self.archive_after_days = days;
        }
        if let Some(enabled) = patch.versioning {
            self.versioning = enabled;
        }
        if let Some(value) = patch.change_details {
            self.change_details = value;
        }
        if let Some(category) = patch.issue_category {
            self.issue_category = Some(category);
        }
        if let Some(value) = patch.issue_description {
            self.issue_description = value;
        }
        if let Some(reference) = patch.attachment_ref {
            self.attachment_ref = reference;
        }
        if let Some(acks) = patch.acknowledgements {
            self.acknowledgements = acks;
        }

        update
    }

    /// Tri-state result for the identifier as it currently reads.
    pub fn account_verification(&self) -> Verification {
        match &self.account_check {
            Some(check) if check.value == self.aws_account_id.trim() => check.status,
            _ => Verification::Unknown,
        }
    }

    /// Stores a verification result if it was issued for the current identifier.
    ///
    /// Returns `false` (and stores nothing) for results tagged with a value the
    /// user has since replaced.
    pub(crate) fn record_verification(&mut self, value: &str, status: Verification) -> bool {
        if value != self.aws_account_id.trim() {
            return false;
        }
        self.account_check = Some(AccountCheck {
            value: value.to_string(),
            status,
        });
        true
    }

    pub fn add_access_grant(&mut self, entry: AccessGrantEntry) -> usize {
        self.access_grants.push(entry);
        self.access_grants.len() - 1
    }

    pub fn update_access_grant(&mut self, index: usize, patch: AccessGrantPatch) -> bool {
        match self.access_grants.get_mut(index) {
            Some(entry) => {
                entry.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn remove_access_grant(&mut self, index: usize) -> Option<AccessGrantEntry> {
        (index < self.access_grants.len()).then(|| self.access_grants.remove(index))
    }

    pub fn set_acknowledgement(&mut self, ack: Acknowledgement, checked: bool) {
        if checked {
            self.acknowledgements.insert(ack);
        } else {
            self.acknowledgements.remove(&ack);
        }
    }
}
