use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::form::{AccessGrantEntry, Acknowledgement, IssueCategory, RequestKind, StorageTier};
use crate::submit::ReporterIdentity;
use crate::wizard::Flow;

/// One named resource (bucket) in the derived, ordered resource list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    pub alias: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccountRecord {
    pub account_name: String,
    pub owner_name: String,
    pub owner_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageRecord {
    pub tier: StorageTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleRecord {
    pub retention_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_after_days: Option<u32>,
    pub versioning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    pub category: IssueCategory,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_ref: Option<String>,
}

/// Body of `POST /requests`. Built once by the assembler and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    pub(crate) request_id: Uuid,
    pub(crate) flow: Flow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) request_kind: Option<RequestKind>,
    pub(crate) submitted_at: DateTime<Utc>,
    pub(crate) reporter: ReporterIdentity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) resources: Vec<ResourceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) aws_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) new_account: Option<NewAccountRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) access_grants: Vec<AccessGrantEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) storage: Option<StorageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) lifecycle: Option<LifecycleRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) change_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) issue: Option<IssueRecord>,
    pub(crate) acknowledgements: Vec<Acknowledgement>,
    #[serde(flatten)]
    pub(crate) extra: BTreeMap<String, serde_json::Value>,
}

impl SubmissionPayload {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn request_kind(&self) -> Option<RequestKind> {
        self.request_kind
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn reporter(&self) -> &ReporterIdentity {
        &self.reporter
    }

    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    pub fn aws_account_id(&self) -> Option<&str> {
        self.aws_account_id.as_deref()
    }

    pub fn new_account(&self) -> Option<&NewAccountRecord> {
        self.new_account.as_ref()
    }

    pub fn access_grants(&self) -> &[AccessGrantEntry] {
        &self.access_grants
    }

    pub fn storage(&self) -> Option<&StorageRecord> {
        self.storage.as_ref()
    }

    pub fn lifecycle(&self) -> Option<&LifecycleRecord> {
        self.lifecycle.as_ref()
    }

    pub fn change_details(&self) -> Option<&str> {
        self.change_details.as_deref()
    }

    pub fn issue(&self) -> Option<&IssueRecord> {
        self.issue.as_ref()
    }

    pub fn acknowledgements(&self) -> &[Acknowledgement] {
        &self.acknowledgements
    }

    pub fn extra(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.extra
    }
}
