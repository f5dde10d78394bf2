//! Events that drive the dutch-pay flow

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// One user chat turn routed to the flow
    UserInput { text: String },

    /// The post-transfer settle timer fired
    ResetTimeout,
}

impl Event {
    pub fn user_input(text: impl Into<String>) -> Self {
        Event::UserInput { text: text.into() }
    }
}
