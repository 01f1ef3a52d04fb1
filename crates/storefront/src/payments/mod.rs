//! Card processor API client.
//!
//! The processor's hosted input fields tokenize the card in the browser; this
//! client only ever sees the resulting single-use token, which it submits
//! together with the payment intent's client secret for confirmation.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::ProcessorConfig;

/// Errors returned by the processor client.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor refused the charge.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The processor answered with an unexpected body.
    #[error("unexpected processor response: {0}")]
    Malformed(String),
}

/// A confirmed charge as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorCharge {
    /// Processor transaction (intent) id.
    pub transaction_id: String,
    /// Charge id, when the processor exposes one.
    pub charge_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest<'a> {
    client_secret: &'a str,
    payment_method: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmResponse {
    status: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    charge_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the card processor's confirmation API.
#[derive(Clone)]
pub struct ProcessorClient {
    inner: Arc<ProcessorClientInner>,
}

struct ProcessorClientInner {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl ProcessorClient {
    /// Create a new processor client.
    #[must_use]
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            inner: Arc::new(ProcessorClientInner {
                client: reqwest::Client::new(),
                api_base: config.api_base.trim_end_matches('/').to_string(),
                secret_key: config.secret_key.expose_secret().to_string(),
            }),
        }
    }

    /// Confirm a card payment against a payment intent.
    ///
    /// Any outcome other than a succeeded charge is a terminal decline for
    /// this attempt; the caller must not retry automatically.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessorError::Declined`] for refused charges and
    /// [`ProcessorError::Http`]/[`ProcessorError::Malformed`] for transport
    /// or contract failures.
    #[instrument(skip(self, client_secret, card_token))]
    pub async fn confirm_card_payment(
        &self,
        client_secret: &str,
        card_token: &str,
    ) -> Result<ProcessorCharge, ProcessorError> {
        let url = format!("{}/v1/intents/confirm", self.inner.api_base);
        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(&self.inner.secret_key)
            .json(&ConfirmRequest {
                client_secret,
                payment_method: card_token,
            })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let body: ConfirmResponse = serde_json::from_str(&text)
            .map_err(|_| ProcessorError::Malformed(text.chars().take(200).collect()))?;

        if !status.is_success() || body.status != "succeeded" {
            let reason = body
                .message
                .unwrap_or_else(|| format!("processor status {}", body.status));
            tracing::warn!(status = %status, reason = %reason, "Card confirmation declined");
            return Err(ProcessorError::Declined(reason));
        }

        let transaction_id = body
            .id
            .ok_or_else(|| ProcessorError::Malformed("succeeded without an id".to_string()))?;

        Ok(ProcessorCharge {
            transaction_id,
            charge_id: body.charge_id,
        })
    }
}
