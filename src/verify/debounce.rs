use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::VerificationSettings;
use crate::verify::{AccountDirectory, Verification, VerificationOutcome};

/// Debounced, cancellable account identifier checks.
///
/// Every call to [`RemoteVerifier::schedule`] supersedes the previous one: the
/// pending task is aborted and a new one waits out the quiet window before
/// asking the directory. Outcomes carry the sequence number they were issued
/// under, and only the latest sequence is ever handed back to the caller.
pub struct RemoteVerifier {
    directory: Arc<dyn AccountDirectory>,
    debounce: Duration,
    timeout: Duration,
    sequence: u64,
    awaiting: Option<u64>,
    pending: Option<JoinHandle<()>>,
    outcomes_tx: mpsc::UnboundedSender<VerificationOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<VerificationOutcome>,
}

impl RemoteVerifier {
    pub fn new(directory: Arc<dyn AccountDirectory>, settings: &VerificationSettings) -> Self {
        Self::with_timing(directory, settings.debounce(), settings.timeout())
    }

    pub fn with_timing(
        directory: Arc<dyn AccountDirectory>,
        debounce: Duration,
        timeout: Duration,
    ) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            directory,
            debounce,
            timeout,
            sequence: 0,
            awaiting: None,
            pending: None,
            outcomes_tx,
            outcomes_rx,
        }
    }

    /// Starts a check for `value`, superseding any earlier one.
    ///
    /// Blank input cancels whatever was pending and issues nothing; the
    /// identifier simply stays `Unknown`. Must be called from within a tokio
    /// runtime when `value` is non-blank.
    pub fn schedule(&mut self, value: &str) -> Option<u64> {
        self.cancel_pending();
        self.sequence += 1;

        let value = value.trim().to_string();
        if value.is_empty() {
            debug!(sequence = self.sequence, "blank account id, skipping verification");
            return None;
        }

        let sequence = self.sequence;
        let directory = Arc::clone(&self.directory);
        let outcomes = self.outcomes_tx.clone();
        let (debounce, timeout) = (self.debounce, self.timeout);

        debug!(sequence, account_id = %value, "scheduling account verification");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let status = check(directory.as_ref(), &value, timeout).await;
            // The receiver lives as long as the verifier; a send error means it is gone.
            let _ = outcomes.send(VerificationOutcome {
                sequence,
                value,
                status,
            });
        }));
        self.awaiting = Some(sequence);
        Some(sequence)
    }

    /// Aborts the in-flight check, if any.
    pub fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.awaiting = None;
    }

    /// A check for the latest value has been issued and not yet returned.
    pub fn is_pending(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn is_current(&self, outcome: &VerificationOutcome) -> bool {
        outcome.sequence == self.sequence
    }

    /// Waits for the outcome of the latest check, dropping superseded ones.
    ///
    /// Returns `None` immediately when nothing is pending.
    pub async fn next_outcome(&mut self) -> Option<VerificationOutcome> {
        while self.awaiting.is_some() {
            let outcome = self.outcomes_rx.recv().await?;
            if let Some(current) = self.accept(outcome) {
                return Some(current);
            }
        }
        None
    }

    /// Non-blocking variant of [`RemoteVerifier::next_outcome`] for event-loop polling.
    pub fn try_next_outcome(&mut self) -> Option<VerificationOutcome> {
        while self.awaiting.is_some() {
            let outcome = self.outcomes_rx.try_recv().ok()?;
            if let Some(current) = self.accept(outcome) {
                return Some(current);
            }
        }
        None
    }

    fn accept(&mut self, outcome: VerificationOutcome) -> Option<VerificationOutcome> {
        if !self.is_current(&outcome) {
            debug!(
                sequence = outcome.sequence,
                latest = self.sequence,
                "discarding superseded verification result"
            );
            return None;
        }
        self.awaiting = None;
        self.pending = None;
        Some(outcome)
    }
}

impl Drop for RemoteVerifier {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// Asks the directory once; errors and timeouts fail closed.
async fn check(directory: &dyn AccountDirectory, account_id: &str, timeout: Duration) -> Verification {
    match tokio::time::timeout(timeout, directory.account_exists(account_id)).await {
        Ok(Ok(true)) => Verification::Valid,
        Ok(Ok(false)) => Verification::Invalid,
        Ok(Err(err)) => {
            warn!(account_id, error = %err, "account verification failed, treating as invalid");
            Verification::Invalid
        }
        Err(_) => {
            warn!(account_id, ?timeout, "account verification timed out, treating as invalid");
            Verification::Invalid
        }
    }
}
