//! Transaction sender abstraction
//!
//! Forwards a receiver/amount pair to the prediction backend.

mod error;
mod http;

pub use error::{SendError, SendErrorKind};
pub use http::HttpTransactionSender;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One transfer to forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub receiver: String,
    pub amount: u64,
}

impl TransferRequest {
    pub fn new(receiver: impl Into<String>, amount: u64) -> Self {
        Self {
            receiver: receiver.into(),
            amount,
        }
    }
}

/// Common interface for transaction backends
#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// Send one transfer; the decoded response body is returned as-is
    async fn send(&self, request: &TransferRequest) -> Result<Value, SendError>;
}

#[async_trait]
impl<T: TransactionSender + ?Sized> TransactionSender for Arc<T> {
    async fn send(&self, request: &TransferRequest) -> Result<Value, SendError> {
        (**self).send(request).await
    }
}

/// Logging wrapper for transaction senders
pub struct LoggingSender {
    inner: Arc<dyn TransactionSender>,
}

impl LoggingSender {
    pub fn new(inner: Arc<dyn TransactionSender>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl TransactionSender for LoggingSender {
    async fn send(&self, request: &TransferRequest) -> Result<Value, SendError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    receiver = %request.receiver,
                    amount = request.amount,
                    duration_ms = %duration.as_millis(),
                    fraud_detected = ?response.get("fraud_detected"),
                    "Transaction sent"
                );
            }
            Err(e) => {
                tracing::error!(
                    receiver = %request.receiver,
                    amount = request.amount,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Transaction failed"
                );
            }
        }

        result
    }
}
