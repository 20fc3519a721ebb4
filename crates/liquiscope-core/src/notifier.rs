//! Telegram alert delivery.
//!
//! One message, one `sendMessage` call. There is no retry or backoff: a
//! failed call is reported through [`DeliveryStatus`] and the caller decides
//! what to do with it.
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use liquiscope_core::notifier::{TelegramConfig, TelegramNotifier};
//! use liquiscope_core::ReqwestHttpClient;
//!
//! let notifier = TelegramNotifier::new(TelegramConfig::from_env()?, Arc::new(ReqwestHttpClient::new()));
//! let status = notifier.send_alert("*AAA* z-score above 2").await;
//! println!("delivered: {}", status.is_delivered());
//! ```

use std::env;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_PARSE_MODE: &str = "Markdown";

const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
const CHAT_ENV: &str = "TELEGRAM_CHAT_ID";
const API_BASE_ENV: &str = "TELEGRAM_API_BASE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifierError {
    #[error("notifier is not configured: {0} is not set")]
    NotConfigured(&'static str),
}

/// Bot credentials and endpoint settings.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
    pub parse_mode: String,
    pub timeout_ms: u64,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: String::from(DEFAULT_API_BASE),
            parse_mode: String::from(DEFAULT_PARSE_MODE),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Read credentials from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
    /// `TELEGRAM_API_BASE` optionally overrides the endpoint.
    ///
    /// # Errors
    /// Returns [`NotifierError::NotConfigured`] naming the first missing or
    /// blank variable.
    pub fn from_env() -> Result<Self, NotifierError> {
        let bot_token = required_env(TOKEN_ENV)?;
        let chat_id = required_env(CHAT_ENV)?;
        let mut config = Self::new(bot_token, chat_id);
        if let Some(api_base) = optional_env(API_BASE_ENV) {
            config.api_base = api_base;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_parse_mode(mut self, parse_mode: impl Into<String>) -> Self {
        self.parse_mode = parse_mode.into();
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

// The token never reaches logs or debug output.
impl Debug for TelegramConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("parse_mode", &self.parse_mode)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required_env(name: &'static str) -> Result<String, NotifierError> {
    optional_env(name).ok_or(NotifierError::NotConfigured(name))
}

/// Outcome of one alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The endpoint accepted the message.
    Delivered { status: u16 },
    /// The endpoint answered with a non-2xx status.
    Rejected { status: u16, body: String },
    /// No answer: connection, timeout or I/O failure.
    Failed { reason: String },
}

impl DeliveryStatus {
    /// HTTP status reported by the endpoint, if it answered.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Delivered { status } | Self::Rejected { status, .. } => Some(*status),
            Self::Failed { .. } => None,
        }
    }

    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Sends alerts to one Telegram chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    http: Arc<dyn HttpClient>,
}

impl Debug for TelegramNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Deliver `message`. Never returns an error; transport failures become
    /// [`DeliveryStatus::Failed`].
    pub async fn send_alert(&self, message: &str) -> DeliveryStatus {
        let request = HttpRequest::post(self.config.send_message_url())
            .with_form(&[
                ("chat_id", self.config.chat_id.as_str()),
                ("text", message),
                ("parse_mode", self.config.parse_mode.as_str()),
            ])
            .with_timeout_ms(self.config.timeout_ms);

        match self.http.execute(request).await {
            Ok(response) if response.is_success() => {
                info!(status = response.status, "alert delivered");
                DeliveryStatus::Delivered {
                    status: response.status,
                }
            }
            Ok(response) => {
                warn!(status = response.status, "alert rejected");
                DeliveryStatus::Rejected {
                    status: response.status,
                    body: response.body,
                }
            }
            Err(error) => {
                let reason = self.redact(error.message());
                warn!(%reason, "alert delivery failed");
                DeliveryStatus::Failed { reason }
            }
        }
    }

    fn redact(&self, text: &str) -> String {
        if self.config.bot_token.is_empty() {
            return text.to_owned();
        }
        text.replace(&self.config.bot_token, "<redacted>")
    }
}
