use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::config::PortalConfig;
use crate::errors::{Result, WizardError};
use crate::submit::{SubmissionPayload, TicketReceipt, TicketSink};
use crate::verify::AccountDirectory;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest client for the portal API (`/accounts/{id}` and `/requests`).
pub struct HttpPortalClient {
    base_url: Url,
    api_token: Option<String>,
    client: Client,
}

// ─── Response Structures ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AccountLookupResponse {
    valid: bool,
}

#[derive(Debug, Deserialize)]
struct TicketResponse {
    #[serde(default, alias = "id")]
    ticket_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ─── Implementation ───────────────────────────────────────────────────────────

impl HttpPortalClient {
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let base_url = Url::parse(config.api_base_url.trim())
            .map_err(|err| WizardError::Config(format!("invalid api_base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(WizardError::Config(format!(
                "api_base_url `{}` cannot carry a path",
                config.api_base_url
            )));
        }

        let api_token = config.api_token.as_deref().and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        let client = Client::builder()
            .timeout(config.submission.timeout())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url,
            api_token,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| WizardError::Config("api_base_url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl AccountDirectory for HttpPortalClient {
    async fn account_exists(&self, account_id: &str) -> Result<bool> {
        let url = self.endpoint(&["accounts", account_id])?;
        debug!(%url, "looking up account");
        let response = self.authorize(self.client.get(url)).send().await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_lookup(status, &body)
    }
}

#[async_trait]
impl TicketSink for HttpPortalClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<TicketReceipt> {
        let url = self.endpoint(&["requests"])?;
        debug!(%url, request_id = %payload.request_id(), "posting submission");
        let response = self
            .authorize(self.client.post(url))
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_submission(status, &body)
    }
}

/// `404` means the account does not exist; other failures are errors.
fn interpret_lookup(status: StatusCode, body: &str) -> Result<bool> {
    if status == StatusCode::NOT_FOUND {
        return Ok(false);
    }
    if !status.is_success() {
        return Err(rejection(status, body));
    }
    serde_json::from_str::<AccountLookupResponse>(body)
        .map(|response| response.valid)
        .map_err(|err| WizardError::InvalidResponse(err.to_string()))
}

/// Receipt is only confirmed when the body names a ticket.
fn interpret_submission(status: StatusCode, body: &str) -> Result<TicketReceipt> {
    if !status.is_success() {
        return Err(rejection(status, body));
    }
    let response: TicketResponse =
        serde_json::from_str(body).map_err(|err| WizardError::InvalidResponse(err.to_string()))?;
    match response.ticket_id.map(|id| id.trim().to_string()) {
        Some(ticket_id) if !ticket_id.is_empty() => Ok(TicketReceipt { ticket_id }),
        _ => Err(WizardError::InvalidResponse(
            "response did not include a ticket id".into(),
        )),
    }
}

fn rejection(status: StatusCode, body: &str) -> WizardError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|response| response.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    WizardError::Rejected {
        status: status.as_u16(),
        message,
    }
}
