//! Run notifications.
//!
//! `Notifier` is the seam the auto-saver reports through. `DiscordNotifier`
//! posts to a webhook; `LogNotifier` only logs and stands in when no webhook
//! is configured.

mod discord;

use async_trait::async_trait;
use rest_client::RestError;
use thiserror::Error;

pub use discord::{split_message, DiscordNotifier, DISCORD_MESSAGE_LIMIT};

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Rest(#[from] RestError),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for human-readable run reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Notifier that writes messages to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        tracing::info!(message = %message, "Notification (no webhook configured)");
        Ok(())
    }
}
