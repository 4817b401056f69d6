//! Async facade a view layer drives: edits, navigation, verification, submit.

use std::sync::Arc;

use crate::client::HttpPortalClient;
use crate::config::PortalConfig;
use crate::errors::Result;
use crate::form::{AccessGrantEntry, AccessGrantPatch, Acknowledgement, FormPatch, FormUpdate};
use crate::submit::{
    PayloadOptions, ReporterIdentity, SubmissionAssembler, TicketReceipt, TicketSink,
};
use crate::verify::{AccountDirectory, RemoteVerifier, Verification};
use crate::wizard::{Flow, StepId, WizardController, WizardView};

/// One active wizard: the controller plus its remote collaborators.
pub struct WizardSession {
    controller: WizardController,
    verifier: RemoteVerifier,
    tickets: Arc<dyn TicketSink>,
}

impl WizardSession {
    pub fn new(
        flow: Flow,
        directory: Arc<dyn AccountDirectory>,
        tickets: Arc<dyn TicketSink>,
        config: &PortalConfig,
    ) -> Self {
        let assembler = SubmissionAssembler::new(PayloadOptions::from_settings(&config.submission));
        Self {
            controller: WizardController::with_assembler(flow, assembler),
            verifier: RemoteVerifier::new(directory, &config.verification),
            tickets,
        }
    }

    /// Session talking to the portal API configured in `config`.
    pub fn connect(flow: Flow, config: &PortalConfig) -> Result<Self> {
        let client = Arc::new(HttpPortalClient::new(config)?);
        Ok(Self::new(flow, client.clone(), client, config))
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    pub fn current_step(&self) -> StepId {
        self.controller.current_step()
    }

    pub fn view(&self) -> WizardView {
        self.controller.view()
    }

    /// Merges an edit and, when the account id changed, re-arms the verifier.
    pub fn update(&mut self, patch: FormPatch) -> FormUpdate {
        let update = self.controller.update_form_data(patch);
        if update.identifier_changed {
            self.verifier.schedule(&self.controller.form().aws_account_id);
        }
        update
    }

    pub fn add_access_grant(&mut self, entry: AccessGrantEntry) -> Option<usize> {
        self.controller.add_access_grant(entry)
    }

    pub fn update_access_grant(&mut self, index: usize, patch: AccessGrantPatch) -> bool {
        self.controller.update_access_grant(index, patch)
    }

    pub fn remove_access_grant(&mut self, index: usize) -> Option<AccessGrantEntry> {
        self.controller.remove_access_grant(index)
    }

    pub fn set_acknowledgement(&mut self, ack: Acknowledgement, checked: bool) {
        self.controller.set_acknowledgement(ack, checked);
    }

    pub fn go_next(&mut self) -> bool {
        self.controller.go_next()
    }

    pub fn go_back(&mut self) -> bool {
        self.controller.go_back()
    }

    pub fn jump_to_step(&mut self, step: StepId) -> bool {
        self.controller.jump_to_step(step)
    }

    pub fn verification_pending(&self) -> bool {
        self.verifier.is_pending()
    }

    /// Applies a finished check without waiting; for event-loop polling.
    pub fn poll_verification(&mut self) -> Verification {
        if let Some(outcome) = self.verifier.try_next_outcome() {
            self.controller.apply_verification(&outcome);
        }
        self.controller.form().account_verification()
    }

    /// Waits for the latest pending check (if any) and applies it.
    pub async fn settle_verification(&mut self) -> Verification {
        while let Some(outcome) = self.verifier.next_outcome().await {
            self.controller.apply_verification(&outcome);
        }
        self.controller.form().account_verification()
    }

    /// Sends the confirmed wizard to the ticketing system.
    ///
    /// On failure the session stays on the confirmation step with every field
    /// intact, and calling `submit` again retries.
    pub async fn submit(&mut self, reporter: &ReporterIdentity) -> Result<TicketReceipt> {
        let payload = self.controller.begin_submission(reporter)?;
        let result = self.tickets.submit(&payload).await;
        let receipt = self.controller.complete_submission(result)?;
        self.verifier.cancel_pending();
        Ok(receipt)
    }
}
