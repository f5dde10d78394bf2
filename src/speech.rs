//! Speech-to-text capture
//!
//! Recognition itself is delegated to an external program; the transcript
//! feeds the same text channel as typed input.

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

pub const RECOGNITION_LANG: &str = "ko-KR";

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech recognition is not configured")]
    Unsupported,
    #[error("Failed to start recognizer: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Recognizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("No speech recognized")]
    NoSpeech,
}

impl SpeechError {
    /// Notice shown in the chat window
    pub fn user_message(&self) -> &'static str {
        match self {
            SpeechError::Unsupported => "음성 인식이 지원되지 않는 환경입니다.",
            _ => "음성 인식 중 오류가 발생했습니다.",
        }
    }
}

/// Produces one utterance per call
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self) -> Result<String, SpeechError>;
}

/// Used when no recognizer is configured
pub struct UnsupportedTranscriber;

#[async_trait]
impl Transcriber for UnsupportedTranscriber {
    async fn transcribe(&self) -> Result<String, SpeechError> {
        Err(SpeechError::Unsupported)
    }
}

/// Runs a shell command and takes its trimmed stdout as the transcript.
/// The command sees `STT_LANG` in its environment.
pub struct CommandTranscriber {
    command: String,
}

impl CommandTranscriber {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Transcriber for CommandTranscriber {
    async fn transcribe(&self) -> Result<String, SpeechError> {
        tracing::debug!(command = %self.command, "Starting speech recognizer");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("STT_LANG", RECOGNITION_LANG)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(SpeechError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(SpeechError::NoSpeech);
        }
        Ok(transcript)
    }
}
