use crate::config::TelegramConfig;
use crate::error::{Result, TrackerError};
use log::{debug, error};
use reqwest::blocking::Client;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Messaging credentials missing or left at their placeholder.
    Skipped,
    Failed,
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// Delivers operator messages. Implementations never fail the caller.
pub trait Notifier {
    fn notify(&self, message: &str) -> Delivery;
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: TelegramConfig) -> Self {
        Self { client, config }
    }

    fn deliver(&self, bot_token: &str, chat_id: &str, message: &str) -> Result<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            bot_token
        );

        let response = self
            .client
            .post(&url)
            .form(&[("chat_id", chat_id), ("text", message), ("parse_mode", "HTML")])
            .send()
            .map_err(|e| TrackerError::NotificationDelivery(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TrackerError::NotificationDelivery(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(TrackerError::NotificationDelivery(format!("HTTP {}: {}", status, body)));
        }

        let parsed: SendMessageResponse = serde_json::from_str(&body)
            .map_err(|e| TrackerError::NotificationDelivery(format!("unexpected response: {}", e)))?;

        if !parsed.ok {
            return Err(TrackerError::NotificationDelivery(
                parsed.description.unwrap_or_else(|| "ok=false".to_string()),
            ));
        }

        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, message: &str) -> Delivery {
        let Some(bot_token) = self.config.usable_bot_token() else {
            debug!("Telegram bot token not configured, message not sent");
            return Delivery::Skipped;
        };
        let Some(chat_id) = self.config.usable_chat_id() else {
            debug!("Telegram chat id not configured, message not sent");
            return Delivery::Skipped;
        };

        match self.deliver(bot_token, chat_id, message) {
            Ok(()) => {
                debug!("Telegram message delivered to chat {}", chat_id);
                Delivery::Sent
            }
            Err(e) => {
                error!("{}", e);
                Delivery::Failed
            }
        }
    }
}
