//! Turning a confirmed wizard into a ticket.

pub mod assembler;
pub mod payload;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub use assembler::{derive_resource_entries, PayloadOptions, SubmissionAssembler};
pub use payload::{ResourceEntry, SubmissionPayload};

/// Who is submitting, supplied by the identity/session store at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterIdentity {
    pub name: String,
    pub email: String,
}

impl ReporterIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Confirmation of receipt from the ticketing system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReceipt {
    pub ticket_id: String,
}

/// The external ticketing collaborator.
#[async_trait]
pub trait TicketSink: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<TicketReceipt>;
}

/// Where the current wizard stands with respect to submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    InFlight,
    Failed { message: String },
    Succeeded { ticket_id: String },
}

impl SubmissionStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionStatus::InFlight)
    }
}
