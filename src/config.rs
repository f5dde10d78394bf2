//! Environment-driven configuration

use crate::runtime::ScreenSettings;
use crate::state_machine::FlowContext;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://voice-monitor-back-production.up.railway.app";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the prediction backend
    pub api_base_url: String,
    /// Sent to the backend as `user_id`
    pub user_email: String,
    pub user_name: String,
    pub step_delay: Duration,
    pub settle_buffer: Duration,
    pub reply_delay: Duration,
    pub completion_delay: Duration,
    pub http_timeout: Duration,
    /// Shell command that prints a transcript to stdout
    pub stt_command: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            user_email: "guest@example.com".to_string(),
            user_name: "고객".to_string(),
            step_delay: Duration::from_millis(1000),
            settle_buffer: Duration::from_millis(500),
            reply_delay: Duration::from_millis(100),
            completion_delay: Duration::from_millis(3000),
            http_timeout: Duration::from_secs(30),
            stt_command: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let millis = |name: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match get(name) {
                Some(value) => parse_u64(name, &value).map(Duration::from_millis),
                None => Ok(default),
            }
        };

        let http_timeout = match get("TRANSFER_HTTP_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_u64("TRANSFER_HTTP_TIMEOUT_SECS", &value)?),
            None => defaults.http_timeout,
        };

        Ok(Self {
            api_base_url: get("TRANSFER_API_URL").unwrap_or(defaults.api_base_url),
            user_email: get("TRANSFER_USER_EMAIL").unwrap_or(defaults.user_email),
            user_name: get("TRANSFER_USER_NAME").unwrap_or(defaults.user_name),
            step_delay: millis("TRANSFER_STEP_MS", defaults.step_delay)?,
            settle_buffer: millis("TRANSFER_SETTLE_BUFFER_MS", defaults.settle_buffer)?,
            reply_delay: millis("TRANSFER_REPLY_DELAY_MS", defaults.reply_delay)?,
            completion_delay: millis("TRANSFER_COMPLETE_DELAY_MS", defaults.completion_delay)?,
            http_timeout,
            stt_command: get("TRANSFER_STT_COMMAND"),
        })
    }

    pub fn screen_settings(&self) -> ScreenSettings {
        ScreenSettings {
            user_name: self.user_name.clone(),
            reply_delay: self.reply_delay,
            completion_delay: self.completion_delay,
            flow: FlowContext::new(self.step_delay, self.settle_buffer),
        }
    }
}

fn parse_u64(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}
