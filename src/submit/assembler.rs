use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::config::SubmissionSettings;
use crate::form::{AccessGrantEntry, FormState, IssueCategory, RequestKind};
use crate::submit::payload::{
    IssueRecord, LifecycleRecord, NewAccountRecord, ResourceEntry, StorageRecord,
    SubmissionPayload,
};
use crate::submit::ReporterIdentity;
use crate::wizard::Flow;

const EXTRA_ALIAS_PREFIX: &str = "extra";

/// Top-level payload keys that configured extra fields may not shadow.
const RESERVED_KEYS: &[&str] = &[
    "request_id",
    "flow",
    "request_kind",
    "submitted_at",
    "reporter",
    "resources",
    "aws_account_id",
    "new_account",
    "access_grants",
    "storage",
    "lifecycle",
    "change_details",
    "issue",
    "acknowledgements",
];

/// Deployment-specific additions to the payload.
#[derive(Debug, Clone, Default)]
pub struct PayloadOptions {
    pub extra_fields: BTreeMap<String, Value>,
}

impl PayloadOptions {
    pub fn from_settings(settings: &SubmissionSettings) -> Self {
        Self {
            extra_fields: settings.extra_fields.clone(),
        }
    }
}

/// Builds [`SubmissionPayload`]s from a confirmed form.
#[derive(Debug, Clone, Default)]
pub struct SubmissionAssembler {
    options: PayloadOptions,
}

impl SubmissionAssembler {
    pub fn new(options: PayloadOptions) -> Self {
        Self { options }
    }

    /// Assembles the payload, keeping only the sections the chosen path filled in.
    pub fn assemble(
        &self,
        flow: Flow,
        form: &FormState,
        reporter: &ReporterIdentity,
    ) -> SubmissionPayload {
        let mut payload = SubmissionPayload {
            request_id: Uuid::new_v4(),
            flow,
            request_kind: None,
            submitted_at: Utc::now(),
            reporter: reporter.clone(),
            resources: Vec::new(),
            aws_account_id: None,
            new_account: None,
            access_grants: Vec::new(),
            storage: None,
            lifecycle: None,
            change_details: None,
            issue: None,
            acknowledgements: form.acknowledgements.iter().copied().collect(),
            extra: self.extra_fields(),
        };

        match flow {
            Flow::Request => fill_request_sections(&mut payload, form),
            Flow::IssueReport => fill_issue_sections(&mut payload, form),
        }

        payload
    }

    fn extra_fields(&self) -> BTreeMap<String, Value> {
        self.options
            .extra_fields
            .iter()
            .filter(|(key, _)| {
                let reserved = RESERVED_KEYS.contains(&key.as_str());
                if reserved {
                    warn!(key = %key, "ignoring extra payload field that shadows a built-in key");
                }
                !reserved
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

fn fill_request_sections(payload: &mut SubmissionPayload, form: &FormState) {
    payload.request_kind = form.request_kind;
    match form.request_kind {
        Some(RequestKind::NewAccount) => {
            payload.new_account = Some(NewAccountRecord {
                account_name: form.account_name.trim().to_string(),
                owner_name: form.owner_name.trim().to_string(),
                owner_email: form.owner_email.trim().to_string(),
                cost_center: non_blank(&form.cost_center),
            });
            payload.access_grants = trimmed_grants(form);
        }
        Some(RequestKind::AccessChange) => {
            payload.aws_account_id = non_blank(&form.aws_account_id);
            payload.access_grants = trimmed_grants(form);
        }
        Some(RequestKind::Storage) => {
            payload.resources = derive_resource_entries(&form.bucket_slots, &form.bucket_notes);
            payload.storage = form.storage_tier.map(|tier| StorageRecord { tier });
            payload.lifecycle = form.retention_days.map(|retention_days| LifecycleRecord {
                retention_days,
                archive_after_days: form.archive_after_days,
                versioning: form.versioning,
            });
        }
        Some(RequestKind::ChangeSettings) => {
            payload.change_details = non_blank(&form.change_details);
        }
        None => {}
    }
}

fn fill_issue_sections(payload: &mut SubmissionPayload, form: &FormState) {
    if form.issue_category == Some(IssueCategory::AccountAccess) {
        payload.aws_account_id = non_blank(&form.aws_account_id);
    }
    payload.issue = form.issue_category.map(|category| IssueRecord {
        category,
        description: form.issue_description.trim().to_string(),
        attachment_ref: form.attachment_ref.as_deref().and_then(non_blank),
    });
}

/// Merges named slots and free-text note lines into one ordered list.
///
/// Slots come first (in slot order, blank values skipped), followed by one
/// entry per non-blank note line with a generated `extra-N` alias.
pub fn derive_resource_entries(slots: &BTreeMap<String, String>, notes: &str) -> Vec<ResourceEntry> {
    let mut entries: Vec<ResourceEntry> = slots
        .iter()
        .filter_map(|(slot, name)| {
            let name = name.trim();
            (!name.is_empty()).then(|| ResourceEntry {
                alias: slot.trim().to_string(),
                name: name.to_string(),
            })
        })
        .collect();

    let mut taken: HashSet<String> = entries.iter().map(|entry| entry.alias.clone()).collect();
    let mut counter = 0;
    for line in notes.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let alias = loop {
            counter += 1;
            let candidate = format!("{}-{}", EXTRA_ALIAS_PREFIX, counter);
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        taken.insert(alias.clone());
        entries.push(ResourceEntry {
            alias,
            name: line.to_string(),
        });
    }

    entries
}

fn trimmed_grants(form: &FormState) -> Vec<AccessGrantEntry> {
    form.access_grants
        .iter()
        .map(|grant| AccessGrantEntry {
            name: grant.name.trim().to_string(),
            email: grant.email.trim().to_string(),
            access_level: grant.access_level,
        })
        .collect()
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
