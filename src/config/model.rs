use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::submit::ReporterIdentity;

/// Connection and behaviour settings for a wizard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "PortalConfig::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default)]
    pub verification: VerificationSettings,
    #[serde(default)]
    pub submission: SubmissionSettings,
    /// Identity used by the console front-end when none is supplied on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<ReporterIdentity>,
}

impl PortalConfig {
    fn default_api_base_url() -> String {
        "http://localhost:8080".into()
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: Self::default_api_base_url(),
            api_token: None,
            verification: VerificationSettings::default(),
            submission: SubmissionSettings::default(),
            reporter: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSettings {
    #[serde(default = "VerificationSettings::default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "VerificationSettings::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl VerificationSettings {
    fn default_debounce_ms() -> u64 {
        500
    }

    fn default_timeout_secs() -> u64 {
        10
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            debounce_ms: Self::default_debounce_ms(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSettings {
    #[serde(default = "SubmissionSettings::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Static fields merged into every submission body, e.g. a queue or project key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_fields: BTreeMap<String, serde_json::Value>,
}

impl SubmissionSettings {
    fn default_timeout_secs() -> u64 {
        30
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout_secs(),
            extra_fields: BTreeMap::new(),
        }
    }
}
