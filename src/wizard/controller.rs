use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{Result, WizardError};
use crate::form::{
    AccessGrantEntry, AccessGrantPatch, Acknowledgement, FormPatch, FormState, FormUpdate,
};
use crate::submit::{
    ReporterIdentity, SubmissionAssembler, SubmissionPayload, SubmissionStatus, TicketReceipt,
};
use crate::verify::{Verification, VerificationOutcome};
use crate::wizard::steps::{Flow, StepDefinition, StepGraph, StepId};
use crate::wizard::validation::{validate_step, StepValidation};

/// Owns the form, the current step, and the path taken to reach it.
///
/// Invalid navigation is never an error: `go_next` on an incomplete step
/// just returns `false` and the view asks [`WizardController::validate_current`]
/// what is missing.
#[derive(Debug)]
pub struct WizardController {
    graph: StepGraph,
    current: StepId,
    history: Vec<StepId>,
    form: FormState,
    submission: SubmissionStatus,
    assembler: SubmissionAssembler,
}

/// Read-only projection handed to the view layer.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub flow: Flow,
    pub step: StepId,
    pub title: &'static str,
    /// 1-based position along the path actually taken.
    pub step_number: usize,
    pub can_go_back: bool,
    pub validation: StepValidation,
    pub account_verification: Verification,
    pub submission: SubmissionStatus,
    pub form: FormState,
}

impl WizardController {
    pub fn new(flow: Flow) -> Self {
        Self::with_assembler(flow, SubmissionAssembler::default())
    }

    pub fn with_assembler(flow: Flow, assembler: SubmissionAssembler) -> Self {
        let graph = StepGraph::for_flow(flow);
        let current = graph.initial();
        Self {
            graph,
            current,
            history: Vec::new(),
            form: FormState::new(),
            submission: SubmissionStatus::Idle,
            assembler,
        }
    }

    pub fn flow(&self) -> Flow {
        self.graph.flow()
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    pub fn current_step(&self) -> StepId {
        self.current
    }

    pub fn history(&self) -> &[StepId] {
        &self.history
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    pub fn is_finished(&self) -> bool {
        self.current == StepId::Success
    }

    pub fn current_definition(&self) -> Option<&StepDefinition> {
        self.graph.definition(self.current)
    }

    /// Validation for any step of this flow; `None` for steps outside it.
    pub fn validate(&self, step: StepId) -> Option<StepValidation> {
        self.graph
            .definition(step)
            .map(|definition| validate_step(definition, &self.form))
    }

    pub fn validate_current(&self) -> StepValidation {
        self.validate(self.current).unwrap_or(StepValidation {
            missing: Vec::new(),
            verification: None,
        })
    }

    pub fn is_step_valid(&self, step: StepId) -> bool {
        self.validate(step).is_some_and(|result| result.is_valid())
    }

    /// Moves along the transition graph if the current step is valid.
    pub fn go_next(&mut self) -> bool {
        if !self.navigation_allowed() {
            return false;
        }
        let validation = self.validate_current();
        if !validation.is_valid() {
            debug!(
                step = %self.current,
                missing = %validation.describe_missing(),
                verification = ?validation.verification,
                "step incomplete, staying put"
            );
            return false;
        }
        let Some(next) = self.graph.advance(self.current, &self.form) else {
            debug!(step = %self.current, "no successor by navigation");
            return false;
        };
        self.enter(next);
        true
    }

    /// Returns to the previously visited step.
    pub fn go_back(&mut self) -> bool {
        if !self.navigation_allowed() {
            return false;
        }
        let Some(previous) = self.history.pop() else {
            return false;
        };
        debug!(from = %self.current, to = %previous, "navigating back");
        self.current = previous;
        true
    }

    /// Explicit skip outside the transition rule. Still recorded for `go_back`.
    pub fn jump_to_step(&mut self, target: StepId) -> bool {
        if !self.navigation_allowed() {
            return false;
        }
        if target == self.current || target == StepId::Success || !self.graph.contains(target) {
            debug!(from = %self.current, to = %target, "jump rejected");
            return false;
        }
        self.enter(target);
        true
    }

    pub fn update_form_data(&mut self, patch: FormPatch) -> FormUpdate {
        if !self.editing_allowed() {
            return FormUpdate::default();
        }
        self.form.merge(patch)
    }

    pub fn add_access_grant(&mut self, entry: AccessGrantEntry) -> Option<usize> {
        self.editing_allowed().then(|| self.form.add_access_grant(entry))
    }

    pub fn update_access_grant(&mut self, index: usize, patch: AccessGrantPatch) -> bool {
        self.editing_allowed() && self.form.update_access_grant(index, patch)
    }

    pub fn remove_access_grant(&mut self, index: usize) -> Option<AccessGrantEntry> {
        if !self.editing_allowed() {
            return None;
        }
        self.form.remove_access_grant(index)
    }

    pub fn set_acknowledgement(&mut self, ack: Acknowledgement, checked: bool) {
        if self.editing_allowed() {
            self.form.set_acknowledgement(ack, checked);
        }
    }

    /// Records a verifier outcome when it matches the identifier as it reads now.
    pub fn apply_verification(&mut self, outcome: &VerificationOutcome) -> bool {
        let applied = self.form.record_verification(&outcome.value, outcome.status);
        if applied {
            debug!(account_id = %outcome.value, status = ?outcome.status, "account verification applied");
        } else {
            debug!(account_id = %outcome.value, "discarding verification for a replaced value");
        }
        applied
    }

    /// First half of a submission: checks the guards, marks the wizard as
    /// submitting, and returns the payload to send.
    pub fn begin_submission(&mut self, reporter: &ReporterIdentity) -> Result<SubmissionPayload> {
        if self.submission.is_in_flight() {
            return Err(WizardError::AlreadySubmitting);
        }
        if self.current != StepId::Confirmation {
            return Err(WizardError::NotAtConfirmation(self.current));
        }
        for step in self.submission_path() {
            self.ensure_complete(step)?;
        }
        self.ensure_complete(self.current)?;

        let payload = self.assembler.assemble(self.flow(), &self.form, reporter);
        info!(
            request_id = %payload.request_id(),
            flow = self.flow().label(),
            "submitting wizard"
        );
        self.submission = SubmissionStatus::InFlight;
        Ok(payload)
    }

    /// Second half of a submission: applies the backend's answer.
    ///
    /// Success moves to the terminal step and drops the form. Failure leaves
    /// the step, history, and form untouched so the user can retry.
    pub fn complete_submission(&mut self, result: Result<TicketReceipt>) -> Result<TicketReceipt> {
        if !self.submission.is_in_flight() {
            warn!("submission result arrived with nothing in flight, ignoring");
            return Err(WizardError::NotSubmitting);
        }
        match result {
            Ok(receipt) => {
                info!(ticket_id = %receipt.ticket_id, "submission confirmed");
                self.submission = SubmissionStatus::Succeeded {
                    ticket_id: receipt.ticket_id.clone(),
                };
                self.history.clear();
                self.current = StepId::Success;
                self.form = FormState::new();
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, "submission failed, form kept for retry");
                self.submission = SubmissionStatus::Failed {
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            flow: self.flow(),
            step: self.current,
            title: self.current_definition().map_or("", |step| step.title),
            step_number: self.history.len() + 1,
            can_go_back: !self.history.is_empty() && self.navigation_allowed(),
            validation: self.validate_current(),
            account_verification: self.form.account_verification(),
            submission: self.submission.clone(),
            form: self.form.clone(),
        }
    }

    fn enter(&mut self, next: StepId) {
        debug!(from = %self.current, to = %next, "advancing");
        self.history.push(self.current);
        self.current = next;
    }

    /// Steps a submission depends on: the route the form selects from the
    /// first step, followed by any other step still on the history stack.
    fn submission_path(&self) -> Vec<StepId> {
        let mut path = Vec::new();
        let mut step = self.graph.initial();
        while step != StepId::Confirmation && !path.contains(&step) {
            path.push(step);
            match self.graph.advance(step, &self.form) {
                Some(next) => step = next,
                None => break,
            }
        }
        for visited in &self.history {
            if !path.contains(visited) {
                path.push(*visited);
            }
        }
        path
    }

    fn ensure_complete(&self, step: StepId) -> Result<()> {
        let Some(validation) = self.validate(step) else {
            return Ok(());
        };
        if validation.is_valid() {
            return Ok(());
        }
        debug!(%step, reason = %validation.describe(), "submission blocked by incomplete step");
        Err(WizardError::StepIncomplete {
            step,
            missing: validation.describe(),
        })
    }

    fn navigation_allowed(&self) -> bool {
        !self.submission.is_in_flight() && !self.is_finished()
    }

    fn editing_allowed(&self) -> bool {
        self.navigation_allowed()
    }
}
