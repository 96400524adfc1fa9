//! # Cashout Alerter
//!
//! Delivers the coach's comment to the user once a fresh snapshot has been written.
//! Delivery runs on its own task, fed by the trigger's broadcast channel, so a failed
//! post can never touch a snapshot that is already stored.

use crate::error::AlerterError;
use async_trait::async_trait;
use configuration::NotificationSettings;
use core_types::ChatMessage;
use database::PerformanceStore;
use events::{AnalysisEvent, SnapshotNotice};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

pub mod error;

/// Somewhere a snapshot notice can be delivered.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn notify(&self, notice: &SnapshotNotice) -> Result<(), AlerterError>;
}

/// The chat text posted for a notice.
pub fn chat_text(notice: &SnapshotNotice) -> String {
    format!(
        "🤖 I've analyzed your latest round. {} {}",
        notice.ai_comment, notice.ai_suggestion
    )
}

/// Posts the coach's comment into the user's chat log.
pub struct ChatNotifier {
    store: Arc<dyn PerformanceStore>,
}

impl ChatNotifier {
    pub fn new(store: Arc<dyn PerformanceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationSink for ChatNotifier {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn notify(&self, notice: &SnapshotNotice) -> Result<(), AlerterError> {
        let message = ChatMessage::from_ai(chat_text(notice));
        self.store.post_chat_message(&notice.user_id, &message).await?;
        Ok(())
    }
}

/// The JSON payload for the Telegram `sendMessage` endpoint.
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str, // To allow for formatting like bold, italics etc.
}

/// A client for pushing notices to a Telegram chat.
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Returns `None` if the token or chat_id is missing from the configuration,
    /// allowing the system to gracefully disable Telegram delivery.
    pub fn new(settings: &NotificationSettings) -> Option<Self> {
        match (&settings.telegram_token, &settings.telegram_chat_id) {
            (Some(token), Some(chat_id)) if !token.is_empty() && !chat_id.is_empty() => Some(Self {
                client: Client::new(),
                token: token.clone(),
                chat_id: chat_id.clone(),
            }),
            _ => None,
        }
    }

    /// Sends a text message to the configured Telegram chat.
    pub async fn send_message(&self, message: &str) -> Result<(), AlerterError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);

        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text: message,
            parse_mode: "MarkdownV2",
        };

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(AlerterError::ApiError(error_text));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, notice: &SnapshotNotice) -> Result<(), AlerterError> {
        let text = format!(
            "*{}*\n{}",
            escape_markdown(&notice.user_id),
            escape_markdown(&chat_text(notice))
        );
        self.send_message(&text).await
    }
}

/// Builds every sink enabled in `settings`.
pub fn build_sinks(settings: &NotificationSettings, store: Arc<dyn PerformanceStore>) -> Vec<Arc<dyn NotificationSink>> {
    let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();
    if settings.chat_enabled {
        sinks.push(Arc::new(ChatNotifier::new(store)));
    }
    match TelegramNotifier::new(settings) {
        Some(telegram) => sinks.push(Arc::new(telegram)),
        None => tracing::debug!("Telegram notifier is not configured."),
    }
    sinks
}

/// A long-running service that listens to the trigger's `AnalysisEvent`s and hands
/// every `SnapshotUpdated` notice to each sink.
///
/// Returns once the channel is closed.
pub async fn run_alerter_service(
    sinks: Vec<Arc<dyn NotificationSink>>,
    mut event_rx: broadcast::Receiver<AnalysisEvent>,
) {
    tracing::info!(sinks = sinks.len(), "Alerter service started.");

    loop {
        match event_rx.recv().await {
            Ok(AnalysisEvent::SnapshotUpdated(notice)) => {
                for sink in &sinks {
                    if let Err(e) = sink.notify(&notice).await {
                        tracing::error!(
                            user_id = %notice.user_id,
                            sink = sink.name(),
                            error = ?e,
                            "Failed to deliver analysis notice."
                        );
                    }
                }
            }
            Ok(_) => {} // Skipped and failed recomputes are not announced.
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Alerter service lagged, skipped {} events.", n);
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("Analysis channel closed. Alerter service shutting down.");
                break;
            }
        }
    }
}

/// Escapes characters that have special meaning in Telegram's MarkdownV2.
fn escape_markdown(text: &str) -> String {
    let special_chars = r"_*[]()~`>#+-=|{}.!";
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if special_chars.contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
