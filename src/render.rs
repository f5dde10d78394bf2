//! Plain-text rendering of screen snapshots for the terminal front end

use crate::chat::{format_won, Message, MessageType, TransferStatus};
use crate::runtime::ScreenSnapshot;
use std::collections::HashMap;

pub const PROCESSING_LINE: &str = "처리 중...";

pub fn header(user_name: &str) -> String {
    format!("==== {user_name}님의 송금 비서 ====\n(/mic: 음성 입력, /quit: 종료)")
}

/// Turns successive snapshots into the lines that are new since the last one
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    /// Message id -> last printed transfer status (None for chat messages)
    seen: HashMap<String, Option<TransferStatus>>,
    processing: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, snapshot: &ScreenSnapshot) -> Vec<String> {
        let mut lines = Vec::new();

        for message in &snapshot.messages {
            let status = message.transfer_status();
            match self.seen.get(&message.id) {
                None => lines.push(format_message(message)),
                Some(printed) if *printed != status => {
                    if let Some(line) = format_status_change(message) {
                        lines.push(line);
                    }
                }
                Some(_) => continue,
            }
            self.seen.insert(message.id.clone(), status);
        }

        if snapshot.processing && !self.processing {
            lines.push(PROCESSING_LINE.to_string());
        }
        self.processing = snapshot.processing;

        lines
    }
}

fn format_message(message: &Message) -> String {
    match message.message_type {
        MessageType::User => format!("[나] {}", message.content),
        MessageType::System => format!("[비서] {}", message.content),
        MessageType::Transfer => match message.transfer_status() {
            Some(status) => format!("[송금] {} ({})", message.content, status.label()),
            None => format!("[송금] {}", message.content),
        },
    }
}

fn format_status_change(message: &Message) -> Option<String> {
    let data = message.transfer_data.as_ref()?;
    Some(format!(
        "[송금] {} {}원: {}",
        data.receiver,
        format_won(data.amount),
        data.status.label()
    ))
}
