//! HTTP implementation of the transaction sender

use super::{SendError, SendErrorKind, TransactionSender, TransferRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const PREDICT_PATH: &str = "/predict/";

/// Posts `{amount, user_id}` to `<base>/predict/`
pub struct HttpTransactionSender {
    client: Client,
    endpoint: String,
    user_id: String,
}

impl HttpTransactionSender {
    /// `user_id` is the signed-in user's email; it is the only identity the
    /// backend receives.
    pub fn new(
        base_url: &str,
        user_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SendError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}{PREDICT_PATH}", base_url.trim_end_matches('/')),
            user_id: user_id.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// The receiver is not part of the wire format.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    amount: u64,
    user_id: &'a str,
}

#[async_trait]
impl TransactionSender for HttpTransactionSender {
    async fn send(&self, request: &TransferRequest) -> Result<Value, SendError> {
        let body = PredictRequest {
            amount: request.amount,
            user_id: &self.user_id,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SendError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    SendError::network(format!("Connection failed: {e}"))
                } else {
                    SendError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SendError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(SendError::new(
                SendErrorKind::from_status(status.as_u16()),
                format!("HTTP {status}: {text}"),
            ));
        }

        serde_json::from_str(&text)
            .map_err(|e| SendError::decode(format!("Failed to parse response: {e} - body: {text}")))
    }
}
