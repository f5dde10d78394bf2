//! Transfer Assistant - Korean chat assistant for money transfers
//!
//! Reads chat turns from stdin (or a speech recognizer), runs them through
//! the screen runtime, and prints the conversation as it changes.

mod chat;
mod config;
mod intent;
mod render;
mod runtime;
mod sender;
mod speech;
mod state_machine;

use config::AppConfig;
use render::TerminalRenderer;
use runtime::{ScreenEvent, ScreenHandle};
use sender::{HttpTransactionSender, LoggingSender};
use speech::{CommandTranscriber, Transcriber, UnsupportedTranscriber};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout carries the chat transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transfer_assistant=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = AppConfig::from_env()?;

    let http = HttpTransactionSender::new(
        &config.api_base_url,
        config.user_email.clone(),
        config.http_timeout,
    )?;
    tracing::info!(endpoint = %http.endpoint(), user = %config.user_email, "Transaction sender ready");
    let sender = LoggingSender::new(Arc::new(http));

    let transcriber: Box<dyn Transcriber> = match &config.stt_command {
        Some(command) => Box::new(CommandTranscriber::new(command.clone())),
        None => {
            tracing::info!("No speech recognizer configured; /mic is unavailable");
            Box::new(UnsupportedTranscriber)
        }
    };

    let handle = ScreenHandle::spawn(config.screen_settings(), sender);

    println!("{}", render::header(&config.user_name));
    let events = handle.subscribe();
    let mut renderer = TerminalRenderer::new();
    print_lines(renderer.render(&handle.snapshot()));
    let printer = tokio::spawn(print_events(renderer, events));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if command == "/quit" {
            break;
        }
        let text = if command == "/mic" {
            match transcriber.transcribe().await {
                Ok(transcript) => transcript,
                Err(e) => {
                    tracing::warn!(error = %e, "Speech recognition failed");
                    println!("[비서] {}", e.user_message());
                    continue;
                }
            }
        } else {
            line
        };

        if let Err(e) = handle.submit(text).await {
            tracing::error!(error = %e, "Could not submit input");
            break;
        }
    }

    handle.shutdown().await;
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "Printer task ended abnormally");
    }

    Ok(())
}

async fn print_events(mut renderer: TerminalRenderer, mut events: broadcast::Receiver<ScreenEvent>) {
    loop {
        match events.recv().await {
            Ok(ScreenEvent::Updated(snapshot)) => print_lines(renderer.render(&snapshot)),
            Ok(ScreenEvent::ScrollToBottom) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Printer lagged behind screen events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
