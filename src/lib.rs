#![doc(test(attr(deny(warnings))))]

//! Portal Wizard drives the multi-step request and issue-report forms of the
//! customer portal: branching navigation with back history, per-step
//! validation, debounced remote account checks, and ticket submission.

pub mod client;
pub mod config;
pub mod errors;
pub mod form;
pub mod session;
pub mod submit;
pub mod utils;
pub mod verify;
pub mod wizard;

use std::sync::Once;

pub use errors::{Result, WizardError};
pub use session::WizardSession;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Portal wizard tracing initialized.");
    });
}
