//! Choice enums and row types captured by the wizard steps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The request chosen on the first page of the request flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    NewAccount,
    Storage,
    AccessChange,
    ChangeSettings,
}

impl RequestKind {
    pub const ALL: [RequestKind; 4] = [
        RequestKind::NewAccount,
        RequestKind::Storage,
        RequestKind::AccessChange,
        RequestKind::ChangeSettings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RequestKind::NewAccount => "New AWS account",
            RequestKind::Storage => "Storage request",
            RequestKind::AccessChange => "Access change",
            RequestKind::ChangeSettings => "Change existing settings",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTier {
    Standard,
    InfrequentAccess,
    Archive,
}

impl StorageTier {
    pub const ALL: [StorageTier; 3] = [
        StorageTier::Standard,
        StorageTier::InfrequentAccess,
        StorageTier::Archive,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StorageTier::Standard => "Standard",
            StorageTier::InfrequentAccess => "Infrequent access",
            StorageTier::Archive => "Archive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessLevel {
    #[default]
    Read,
    Write,
    #[serde(rename = "Read/Write")]
    ReadWrite,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 3] = [AccessLevel::Read, AccessLevel::Write, AccessLevel::ReadWrite];

    pub fn label(self) -> &'static str {
        match self {
            AccessLevel::Read => "Read",
            AccessLevel::Write => "Write",
            AccessLevel::ReadWrite => "Read/Write",
        }
    }
}

/// One row of the user-extensible access grant table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessGrantEntry {
    pub name: String,
    pub email: String,
    pub access_level: AccessLevel,
}

impl AccessGrantEntry {
    pub fn new(name: impl Into<String>, email: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            access_level,
        }
    }

    /// Both name and email carry non-whitespace content.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }

    pub(crate) fn apply(&mut self, patch: AccessGrantPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(level) = patch.access_level {
            self.access_level = level;
        }
    }
}

/// Partial edit of a single access grant row.
#[derive(Debug, Clone, Default)]
pub struct AccessGrantPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub access_level: Option<AccessLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    AccountAccess,
    Billing,
    Storage,
    Other,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 4] = [
        IssueCategory::AccountAccess,
        IssueCategory::Billing,
        IssueCategory::Storage,
        IssueCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IssueCategory::AccountAccess => "Account access",
            IssueCategory::Billing => "Billing",
            IssueCategory::Storage => "Storage",
            IssueCategory::Other => "Other",
        }
    }
}

/// Items of the confirmation checklist. Each flow requires a fixed subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acknowledgement {
    DetailsAccurate,
    SecurityPolicy,
    CostResponsibility,
    DataClassification,
}

impl Acknowledgement {
    pub fn label(self) -> &'static str {
        match self {
            Acknowledgement::DetailsAccurate => "The details provided are accurate",
            Acknowledgement::SecurityPolicy => "I have read the cloud security policy",
            Acknowledgement::CostResponsibility => "My team is responsible for the resulting costs",
            Acknowledgement::DataClassification => "No restricted data will be stored without approval",
        }
    }
}
