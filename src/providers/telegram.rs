//! Telegram alert delivery
//!
//! Posts Markdown messages through the Bot API `sendMessage` method.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::config::TelegramConfig;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{NOTIFIER_TIMEOUT_SECS, TELEGRAM_API_BASE, USER_AGENT as USER_AGENT_CONST};

/// Anything that can deliver an alert message
pub trait AlertSink: Send + Sync {
    fn send(&self, message: &str) -> impl Future<Output = AppResult<()>> + Send;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    api_base: String,
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> AppResult<Self> {
        Self::with_api_base(TELEGRAM_API_BASE, bot_token, chat_id)
    }

    pub fn from_config(config: &TelegramConfig) -> AppResult<Self> {
        Self::new(config.bot_token.clone(), config.chat_id.clone())
    }

    /// Point at a different Bot API host (self-hosted server, tests)
    pub fn with_api_base(
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(NOTIFIER_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

impl AlertSink for TelegramNotifier {
    async fn send(&self, message: &str) -> AppResult<()> {
        if self.bot_token.trim().is_empty() || self.chat_id.trim().is_empty() {
            return Err(AppError::notifier_failed("Bot Token or Chat ID not provided."));
        }

        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: message,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors can echo the URL, which carries the token
                let reason = if e.is_timeout() { "timeout" } else { "request failed" };
                warn!("⚠️ Telegram delivery failed: {}", reason);
                AppError::notifier_failed(format!("Telegram delivery failed: {}", reason))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("⚠️ Telegram API returned status: {}", status);
            return Err(AppError::notifier_failed(format!(
                "Telegram API returned status: {}",
                status
            )));
        }

        info!("📨 Alert delivered to Telegram chat {}", self.chat_id);
        Ok(())
    }
}
