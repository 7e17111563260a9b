//! Discord webhook delivery.

use crate::{Notifier, NotifyError};
use async_trait::async_trait;
use rest_client::RestClient;
use serde::Serialize;
use std::time::Duration;

/// Maximum `content` length Discord accepts in one message.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// Posts messages to a Discord webhook URL.
pub struct DiscordNotifier {
    client: RestClient,
}

impl DiscordNotifier {
    pub fn new(webhook_url: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            client: RestClient::new(webhook_url, WEBHOOK_TIMEOUT)?,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let headers = [("Content-Type", "application/json")];

        for chunk in split_message(message, DISCORD_MESSAGE_LIMIT) {
            let body = serde_json::to_string(&WebhookMessage { content: &chunk })?;
            let status = self.client.post_empty("", Some(body), Some(&headers)).await?;

            if status != 204 {
                tracing::warn!(status = status, "Unexpected Discord webhook status");
            }
        }

        tracing::debug!(chars = message.chars().count(), "Discord notification sent");
        Ok(())
    }
}

impl std::fmt::Debug for DiscordNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The webhook URL embeds its own token.
        f.debug_struct("DiscordNotifier")
            .field("webhook_url", &"[REDACTED]")
            .finish()
    }
}

/// Split `message` into chunks of at most `limit` characters.
///
/// Breaks on line boundaries where possible; a single line longer than
/// `limit` is cut at character boundaries.
pub fn split_message(message: &str, limit: usize) -> Vec<String> {
    if message.chars().count() <= limit {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in message.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_short_message_single_chunk() {
        assert_eq!(split_message("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn test_split_on_lines() {
        let chunks = split_message("aaaa\nbbbb\ncccc", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn test_split_long_line() {
        let chunks = split_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_split_counts_chars_not_bytes() {
        let message = "가나다라\n마바사아";
        let chunks = split_message(message, 5);
        assert_eq!(chunks, vec!["가나다라\n".to_string(), "마바사아".to_string()]);
    }

    #[tokio::test]
    async fn test_send_posts_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/webhooks/1/token")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({"content": "주문 완료"})))
            .with_status(204)
            .create_async()
            .await;

        let notifier = DiscordNotifier::new(&format!("{}/api/webhooks/1/token", server.url()))
            .unwrap();
        notifier.send("주문 완료").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_long_message_posts_chunks() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(204)
            .expect(2)
            .create_async()
            .await;

        let line = "x".repeat(1500);
        let message = format!("{line}\n{line}");

        let notifier = DiscordNotifier::new(&format!("{}/hook", server.url())).unwrap();
        notifier.send(&message).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_fails_on_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(404)
            .with_body(r#"{"message": "Unknown Webhook", "code": 10015}"#)
            .create_async()
            .await;

        let notifier = DiscordNotifier::new(&format!("{}/hook", server.url())).unwrap();
        let err = notifier.send("hi").await.unwrap_err();
        assert!(matches!(err, NotifyError::Rest(_)));
    }

    #[test]
    fn test_debug_redacts_url() {
        let notifier = DiscordNotifier::new("https://discord.com/api/webhooks/1/secret").unwrap();
        assert!(!format!("{:?}", notifier).contains("secret"));
    }
}
