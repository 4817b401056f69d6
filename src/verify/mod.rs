//! Remote confirmation of the AWS account identifier.

pub mod debounce;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::Result;

pub use debounce::RemoteVerifier;

/// Result of a remote identifier check.
///
/// `Unknown` covers both "never checked" and "check pending", so a view can
/// tell it apart from a check that came back negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    #[default]
    Unknown,
    Valid,
    Invalid,
}

/// Remote service able to tell whether an account identifier is real and usable.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn account_exists(&self, account_id: &str) -> Result<bool>;
}

/// A finished check, tagged with what it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub sequence: u64,
    pub value: String,
    pub status: Verification,
}
