use std::result::Result as StdResult;

use thiserror::Error;

use crate::config::ConfigError;
use crate::wizard::StepId;

/// Error type covering remote calls, submission guards, and configuration.
///
/// Field-level invalidity is never reported through this type; the controller
/// simply refuses to advance and the view asks the validators why.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("A submission is already in progress")]
    AlreadySubmitting,
    #[error("No submission is in progress")]
    NotSubmitting,
    #[error("Submission is only available from the confirmation step (current: {0})")]
    NotAtConfirmation(StepId),
    #[error("Step `{step}` is incomplete: {missing}")]
    StepIncomplete { step: StepId, missing: String },
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, WizardError>;

impl From<reqwest::Error> for WizardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WizardError::InvalidResponse(err.to_string())
        } else {
            WizardError::Transport(err.to_string())
        }
    }
}

impl From<ConfigError> for WizardError {
    fn from(err: ConfigError) -> Self {
        WizardError::Config(err.to_string())
    }
}
