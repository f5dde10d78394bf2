//! Runtime for the transfer chat screen
//!
//! One task owns the message history, the processing flag, and the dutch-pay
//! flow state. Everything else (typed input, timers, network sends) talks to
//! it through a channel, and front ends render the snapshots it publishes.

mod executor;


pub use executor::ScreenRuntime;

use crate::chat::{Message, TransferStatus};
use crate::sender::TransactionSender;
use crate::state_machine::{DutchPayState, FlowContext};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Per-session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSettings {
    /// Shown in the greeting
    pub user_name: String,
    /// Typing delay before the dutch-pay flow answers
    pub reply_delay: Duration,
    /// How long a sent regular transfer shows as processing
    pub completion_delay: Duration,
    pub flow: FlowContext,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            user_name: "고객".to_string(),
            reply_delay: Duration::from_millis(100),
            completion_delay: Duration::from_millis(3000),
            flow: FlowContext::default(),
        }
    }
}

/// Everything a front end needs to draw the screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenSnapshot {
    pub messages: Vec<Message>,
    pub processing: bool,
    pub dutch_pay: DutchPayState,
}

#[cfg(test)]
impl ScreenSnapshot {
    pub fn transfers(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.message_type == crate::chat::MessageType::Transfer)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Events sent to front ends
#[derive(Debug, Clone)]
pub enum ScreenEvent {
    Updated(Arc<ScreenSnapshot>),
    ScrollToBottom,
}

/// Inputs processed by the runtime loop
#[derive(Debug)]
pub(crate) enum ScreenInput {
    /// A chat turn from the user (typed or transcribed)
    Submit { text: String },
    /// A user turn for the dutch-pay flow, delivered after the reply delay
    FlowTurn { text: String },
    /// The post-transfer settle timer fired
    FlowReset,
    /// The backend accepted a regular transfer
    TransferSent { message_id: String },
    TransferSettled {
        message_id: String,
        status: TransferStatus,
    },
    /// A regular transfer could not be sent
    TransferError { message_id: String, error: String },
}

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("Screen runtime has stopped")]
    Closed,
}

/// Handle to a running screen
///
/// Dropping the handle cancels every pending timer and stops the runtime.
pub struct ScreenHandle {
    input_tx: mpsc::Sender<ScreenInput>,
    broadcast_tx: broadcast::Sender<ScreenEvent>,
    snapshot_rx: watch::Receiver<Arc<ScreenSnapshot>>,
    task: JoinHandle<()>,
    cancel: CancellationToken,
    _cancel_guard: DropGuard,
}

impl ScreenHandle {
    pub fn spawn<S: TransactionSender + 'static>(settings: ScreenSettings, sender: S) -> Self {
        let (input_tx, input_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let cancel = CancellationToken::new();

        let runtime = ScreenRuntime::new(
            settings,
            sender,
            input_rx,
            input_tx.clone(),
            broadcast_tx.clone(),
            cancel.clone(),
        );
        let snapshot_rx = runtime.watch_snapshots();
        let task = tokio::spawn(runtime.run());

        Self {
            input_tx,
            broadcast_tx,
            snapshot_rx,
            task,
            _cancel_guard: cancel.clone().drop_guard(),
            cancel,
        }
    }

    /// Submit one chat turn
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), ScreenError> {
        if self.cancel.is_cancelled() {
            return Err(ScreenError::Closed);
        }
        self.input_tx
            .send(ScreenInput::Submit { text: text.into() })
            .await
            .map_err(|_| ScreenError::Closed)
    }

    /// Latest published state
    pub fn snapshot(&self) -> Arc<ScreenSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScreenEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Cancel pending timers and stop the runtime. Later submissions fail
    /// with [`ScreenError::Closed`].
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Close the screen and wait for the runtime to stop
    pub async fn shutdown(self) {
        self.close();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Screen runtime ended abnormally");
        }
    }
}
