use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::utils::http_client::create_http_client;

const SLACK_API_BASE_URL: &str = "https://slack.com/api";

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Slack accepted the request but refused it, e.g. `ratelimited`
    #[error("Slack API error: {0}")]
    Api(String),
    #[error("Slack request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Slack request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Delivers a formatted message to a chat channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), NotifyError>;
}

/// Posts through `chat.postMessage` with a bot token
pub struct SlackClient {
    client: Client,
    token: String,
    api_base_url: String,
}

impl SlackClient {
    pub fn new(token: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            token,
            api_base_url: SLACK_API_BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base_url))
            .bearer_auth(&self.token)
            .json(&json!({
                "channel": channel,
                "text": text,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        let reply: PostMessageResponse = response.json().await?;
        let ts = reply.into_result()?;
        log::info!("Message sent to {}: {}", channel, ts);
        Ok(())
    }
}

/// Posts to an incoming webhook; the channel is fixed by the webhook itself
pub struct SlackWebhook {
    client: Client,
    url: String,
}

impl SlackWebhook {
    pub fn new(url: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            url,
        })
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    async fn post_message(&self, _channel: &str, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Webhooks answer with a bare error code such as `invalid_payload`
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        log::info!("Message sent to webhook");
        Ok(())
    }
}

/// Writes the message to stdout instead of posting it
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        log::info!("Dry run, not posting to {}", channel);
        println!("{}", text);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
    ts: Option<String>,
}

impl PostMessageResponse {
    fn into_result(self) -> Result<String, NotifyError> {
        if self.ok {
            Ok(self.ts.unwrap_or_default())
        } else {
            Err(NotifyError::Api(
                self.error.unwrap_or_else(|| "unknown_error".to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(value: serde_json::Value) -> PostMessageResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_successful_reply_returns_timestamp() {
        let ts = reply(json!({ "ok": true, "channel": "C123", "ts": "1672700000.000100" }))
            .into_result()
            .unwrap();
        assert_eq!(ts, "1672700000.000100");
    }

    #[test]
    fn test_error_reply_keeps_slack_code() {
        let err = reply(json!({ "ok": false, "error": "ratelimited" }))
            .into_result()
            .unwrap_err();
        assert!(matches!(err, NotifyError::Api(ref code) if code == "ratelimited"));
        assert_eq!(err.to_string(), "Slack API error: ratelimited");
    }

    #[test]
    fn test_error_reply_without_code() {
        let err = reply(json!({ "ok": false })).into_result().unwrap_err();
        assert_eq!(err.to_string(), "Slack API error: unknown_error");
    }

    #[tokio::test]
    async fn test_stdout_notifier_always_succeeds() {
        assert!(StdoutNotifier.post_message("C123", "hello").await.is_ok());
    }
}
