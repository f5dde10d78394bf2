//! Effects produced by state transitions

use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append an assistant reply to the chat
    Reply { text: String },

    /// Append a `processing` transfer record now and send it after `delay`
    ScheduleTransfer {
        receiver: String,
        amount: u64,
        delay: Duration,
    },

    /// Deliver `Event::ResetTimeout` after `delay`
    ScheduleReset { delay: Duration },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }
}
