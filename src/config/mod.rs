//! Portal connection settings and their on-disk persistence.
//!
//! Owns the [`PortalConfig`] model plus the JSON-backed [`ConfigManager`].

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{PortalConfig, SubmissionSettings, VerificationSettings};
