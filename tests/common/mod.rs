#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use portal_wizard::{
    config::PortalConfig,
    submit::{SubmissionPayload, TicketReceipt, TicketSink},
    verify::AccountDirectory,
    wizard::Flow,
    Result, WizardError, WizardSession,
};

pub const KNOWN_ACCOUNT: &str = "123456789012";

/// Directory that knows a fixed set of account ids and records every lookup.
#[derive(Default)]
pub struct FakeDirectory {
    known: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub fn with_accounts(ids: &[&str]) -> Self {
        Self {
            known: ids.iter().map(|id| id.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock directory calls").clone()
    }
}

#[async_trait]
impl AccountDirectory for FakeDirectory {
    async fn account_exists(&self, account_id: &str) -> Result<bool> {
        self.calls
            .lock()
            .expect("lock directory calls")
            .push(account_id.to_string());
        Ok(self.known.contains(account_id))
    }
}

/// Ticket sink that fails a configurable number of times before accepting.
#[derive(Default)]
pub struct FakeTickets {
    failures_left: AtomicUsize,
    payloads: Mutex<Vec<SubmissionPayload>>,
}

impl FakeTickets {
    pub fn failing(times: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(times),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn payloads(&self) -> Vec<SubmissionPayload> {
        self.payloads.lock().expect("lock payloads").clone()
    }
}

#[async_trait]
impl TicketSink for FakeTickets {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<TicketReceipt> {
        let attempt = {
            let mut payloads = self.payloads.lock().expect("lock payloads");
            payloads.push(payload.clone());
            payloads.len()
        };
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(WizardError::Rejected {
                status: 503,
                message: "ticketing unavailable".into(),
            });
        }
        Ok(TicketReceipt {
            ticket_id: format!("TCK-{attempt}"),
        })
    }
}

/// Session wired to fakes, using the default debounce and timeouts.
pub fn session_with(
    flow: Flow,
    directory: Arc<FakeDirectory>,
    tickets: Arc<FakeTickets>,
) -> WizardSession {
    WizardSession::new(flow, directory, tickets, &PortalConfig::default())
}
