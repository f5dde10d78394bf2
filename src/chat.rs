//! Chat message types
//!
//! The message list is append-only; the only in-place mutation is the
//! status of a transfer record, which moves from `Processing` to a terminal
//! status exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who (or what) produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    User,
    System,
    Transfer,
}

/// Lifecycle of a single transfer record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Processing,
    Completed,
    Failed,
}

impl TransferStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransferStatus::Processing)
    }

    /// Label shown next to a transfer bubble
    pub fn label(self) -> &'static str {
        match self {
            TransferStatus::Processing => "처리 중",
            TransferStatus::Completed => "완료",
            TransferStatus::Failed => "실패",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferData {
    pub receiver: String,
    pub amount: u64,
    pub status: TransferStatus,
}

/// One entry in the chat history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_data: Option<TransferData>,
    #[serde(default)]
    pub is_streaming: bool,
}

impl Message {
    fn new(message_type: MessageType, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message_type,
            content,
            timestamp: Utc::now(),
            transfer_data: None,
            is_streaming: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageType::User, content.into())
    }

    /// System replies are rendered with a typing animation
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            is_streaming: true,
            ..Self::new(MessageType::System, content.into())
        }
    }

    /// A transfer record, always created in `Processing`
    pub fn transfer(receiver: impl Into<String>, amount: u64) -> Self {
        let receiver = receiver.into();
        let content = format!("{receiver}님에게 {}원을 송금합니다.", format_won(amount));
        Self {
            transfer_data: Some(TransferData {
                receiver,
                amount,
                status: TransferStatus::Processing,
            }),
            ..Self::new(MessageType::Transfer, content)
        }
    }

    pub fn transfer_status(&self) -> Option<TransferStatus> {
        self.transfer_data.as_ref().map(|t| t.status)
    }
}

/// Ordered chat history with status updates by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    /// Settle a transfer record. Returns false when the id is unknown, the
    /// message is not a transfer, or the transfer already reached a terminal
    /// status.
    pub fn set_transfer_status(&mut self, id: &str, status: TransferStatus) -> bool {
        let Some(transfer) = self
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .and_then(|m| m.transfer_data.as_mut())
        else {
            return false;
        };

        if transfer.status.is_terminal() {
            return false;
        }
        transfer.status = status;
        true
    }
}

/// Format a won amount with thousands separators (`40000` -> `40,000`)
pub fn format_won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
