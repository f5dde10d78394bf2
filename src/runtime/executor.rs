//! Screen runtime executor

use super::{ScreenEvent, ScreenInput, ScreenSettings, ScreenSnapshot};
use crate::chat::{Message, MessageLog, TransferStatus};
use crate::intent::{parse_intent, Intent};
use crate::sender::{TransactionSender, TransferRequest};
use crate::state_machine::{transition, DutchPayState, Effect, Event, TransitionError};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

pub const HELP_MESSAGE: &str = "송금 요청을 이해하지 못했습니다. \"김민수에게 5만원 보내줘\" 또는 \"친구들이랑 밥먹고 더치페이해야 하는데\"와 같이 말씀해주세요.";

pub const TRANSFER_ERROR_MESSAGE: &str = "송금 처리 중 오류가 발생했습니다. 다시 시도해주세요.";

fn greeting(user_name: &str) -> String {
    format!("안녕하세요 {user_name}님! 음성 또는 텍스트로 송금을 요청해주세요.")
}

/// Screen runtime that works with any transaction sender
pub struct ScreenRuntime<S: TransactionSender + 'static> {
    settings: ScreenSettings,
    messages: MessageLog,
    processing: bool,
    flow: DutchPayState,
    sender: Arc<S>,
    input_rx: mpsc::Receiver<ScreenInput>,
    input_tx: mpsc::Sender<ScreenInput>,
    broadcast_tx: broadcast::Sender<ScreenEvent>,
    snapshot_tx: watch::Sender<Arc<ScreenSnapshot>>,
    /// Cancels every timer and send spawned by this runtime
    cancel: CancellationToken,
}

impl<S: TransactionSender + 'static> ScreenRuntime<S> {
    pub(crate) fn new(
        settings: ScreenSettings,
        sender: S,
        input_rx: mpsc::Receiver<ScreenInput>,
        input_tx: mpsc::Sender<ScreenInput>,
        broadcast_tx: broadcast::Sender<ScreenEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let mut messages = MessageLog::new();
        messages.push(Message::system(greeting(&settings.user_name)));

        let flow = DutchPayState::default();
        let (snapshot_tx, _) = watch::channel(Arc::new(ScreenSnapshot {
            messages: messages.as_slice().to_vec(),
            processing: false,
            dutch_pay: flow.clone(),
        }));

        Self {
            settings,
            messages,
            processing: false,
            flow,
            sender: Arc::new(sender),
            input_rx,
            input_tx,
            broadcast_tx,
            snapshot_tx,
            cancel,
        }
    }

    pub fn watch_snapshots(&self) -> watch::Receiver<Arc<ScreenSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub async fn run(mut self) {
        tracing::info!(user = %self.settings.user_name, "Starting screen runtime");

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                Some(input) = self.input_rx.recv() => self.handle_input(input),
            }
        }

        tracing::info!("Screen runtime stopped");
    }

    fn handle_input(&mut self, input: ScreenInput) {
        match input {
            ScreenInput::Submit { text } => self.submit(&text),

            ScreenInput::FlowTurn { text } => {
                self.apply_flow_event(Event::user_input(text));
                self.finish_dispatch();
            }

            ScreenInput::FlowReset => {
                self.apply_flow_event(Event::ResetTimeout);
                self.publish();
            }

            ScreenInput::TransferSent { message_id } => {
                self.finish_dispatch();

                let completion_delay = self.settings.completion_delay;
                self.spawn_task(async move {
                    tokio::time::sleep(completion_delay).await;
                    ScreenInput::TransferSettled {
                        message_id,
                        status: TransferStatus::Completed,
                    }
                });
            }

            ScreenInput::TransferSettled { message_id, status } => {
                if self.messages.set_transfer_status(&message_id, status) {
                    tracing::info!(message_id = %message_id, status = ?status, "Transfer settled");
                    self.publish();
                } else {
                    tracing::debug!(message_id = %message_id, "Ignoring status update for settled transfer");
                }
            }

            ScreenInput::TransferError { message_id, error } => {
                // The transfer record itself stays in `processing`.
                tracing::warn!(message_id = %message_id, error = %error, "Regular transfer failed");
                self.messages.push(Message::system(TRANSFER_ERROR_MESSAGE));
                self.finish_dispatch();
            }
        }
    }

    fn submit(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.messages.push(Message::user(text));
        self.processing = true;
        self.publish();

        if self.flow.is_active() {
            self.defer_flow_turn(text);
            return;
        }

        match parse_intent(text) {
            Some(Intent::DutchPay) => {
                tracing::info!("Starting dutch-pay flow");
                self.defer_flow_turn(text);
            }
            Some(Intent::RegularTransfer { receiver, amount }) => {
                // Stays processing until the send reports back
                self.start_regular_transfer(receiver, amount);
                self.publish();
            }
            None => {
                tracing::debug!(text = %text, "Unrecognized request");
                self.messages.push(Message::system(HELP_MESSAGE));
                self.finish_dispatch();
            }
        }
    }

    fn defer_flow_turn(&self, text: &str) {
        let delay = self.settings.reply_delay;
        let text = text.to_string();
        self.spawn_task(async move {
            tokio::time::sleep(delay).await;
            ScreenInput::FlowTurn { text }
        });
    }

    fn apply_flow_event(&mut self, event: Event) {
        match transition(&self.flow, &self.settings.flow, event) {
            Ok(result) => {
                tracing::info!(
                    from = ?self.flow.step(),
                    to = ?result.new_state.step(),
                    per_person = ?result.new_state.split().map(|s| s.amount_per_person),
                    friends = ?result.new_state.friends(),
                    "Dutch-pay flow transition"
                );
                self.flow = result.new_state;
                for effect in result.effects {
                    self.execute_effect(effect);
                }
            }
            Err(e @ TransitionError::InvalidTransition(_)) => {
                tracing::warn!(step = ?self.flow.step(), error = %e, "Unexpected dutch-pay event");
            }
            Err(e) => {
                tracing::debug!(step = ?self.flow.step(), reason = %e, "Dutch-pay flow stalled");
            }
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Reply { text } => self.messages.push(Message::system(text)),

            Effect::ScheduleTransfer {
                receiver,
                amount,
                delay,
            } => {
                let message = Message::transfer(receiver.clone(), amount);
                let message_id = message.id.clone();
                self.messages.push(message);

                let sender = Arc::clone(&self.sender);
                self.spawn_task(async move {
                    tokio::time::sleep(delay).await;
                    let status = match sender.send(&TransferRequest::new(receiver, amount)).await {
                        Ok(_) => TransferStatus::Completed,
                        Err(_) => TransferStatus::Failed,
                    };
                    ScreenInput::TransferSettled { message_id, status }
                });
            }

            Effect::ScheduleReset { delay } => {
                self.spawn_task(async move {
                    tokio::time::sleep(delay).await;
                    ScreenInput::FlowReset
                });
            }
        }
    }

    fn start_regular_transfer(&mut self, receiver: String, amount: u64) {
        let message = Message::transfer(receiver.clone(), amount);
        let message_id = message.id.clone();
        self.messages.push(message);

        let sender = Arc::clone(&self.sender);
        self.spawn_task(async move {
            match sender.send(&TransferRequest::new(receiver, amount)).await {
                Ok(_) => ScreenInput::TransferSent { message_id },
                Err(e) => ScreenInput::TransferError {
                    message_id,
                    error: e.to_string(),
                },
            }
        });
    }

    /// Run `work` in the background and feed its result back into the loop,
    /// unless the runtime is torn down first.
    fn spawn_task<F>(&self, work: F)
    where
        F: Future<Output = ScreenInput> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let input_tx = self.input_tx.clone();
        tokio::spawn(async move {
            let input = tokio::select! {
                () = cancel.cancelled() => return,
                input = work => input,
            };
            let _ = input_tx.send(input).await;
        });
    }

    fn finish_dispatch(&mut self) {
        self.processing = false;
        self.publish();
        self.scroll_to_bottom();
    }

    fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            messages: self.messages.as_slice().to_vec(),
            processing: self.processing,
            dutch_pay: self.flow.clone(),
        }
    }

    fn publish(&self) {
        let snapshot = Arc::new(self.snapshot());
        self.snapshot_tx.send_replace(snapshot.clone());
        let _ = self.broadcast_tx.send(ScreenEvent::Updated(snapshot));
    }

    fn scroll_to_bottom(&self) {
        let _ = self.broadcast_tx.send(ScreenEvent::ScrollToBottom);
    }
}
