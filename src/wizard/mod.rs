//! The branching wizard state machine.

pub mod controller;
pub mod steps;
pub mod validation;

pub use controller::{WizardController, WizardView};
pub use steps::{Flow, StepDefinition, StepGraph, StepId, Transition};
pub use validation::{is_step_valid, validate_step, FieldKey, StepValidation};
