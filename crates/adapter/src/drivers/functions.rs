use domain::protocol::{ChatReply, ChatRequest};
use std::time::Duration;
use tracing::error;

use crate::error::AdapterError;

pub const CHAT_FAILURE_TEXT: &str = "Sorry, something went wrong. Try again.";
pub const CHAT_EMPTY_TEXT: &str = "No reply.";

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
    anon_key: String,
}

impl ChatClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, AdapterError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            url: format!("{}/functions/v1/chat", base_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        })
    }

    async fn invoke(&self, message: &str) -> Result<ChatReply, AdapterError> {
        let resp = self
            .http
            .post(&self.url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AdapterError::Status {
                status: status.as_u16(),
                message,
            });
        }
        resp.json::<ChatReply>()
            .await
            .map_err(|e| AdapterError::Malformed(e.to_string()))
    }

    pub async fn ask(&self, input: &str) -> Option<String> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }
        Some(reply_text(self.invoke(message).await))
    }
}

pub fn reply_text(result: Result<ChatReply, AdapterError>) -> String {
    match result {
        Ok(reply) if reply.reply.trim().is_empty() => CHAT_EMPTY_TEXT.to_string(),
        Ok(reply) => reply.reply,
        Err(e) => {
            error!("Chat request failed: {}", e);
            CHAT_FAILURE_TEXT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_outcomes_to_bubble_text() {
        assert_eq!(
            reply_text(Ok(ChatReply {
                reply: "Hi there".into()
            })),
            "Hi there"
        );
        assert_eq!(reply_text(Ok(ChatReply { reply: "".into() })), CHAT_EMPTY_TEXT);
        assert_eq!(
            reply_text(Err(AdapterError::Status {
                status: 502,
                message: "{\"error\":\"AI service error\"}".into()
            })),
            CHAT_FAILURE_TEXT
        );
    }

    #[tokio::test]
    async fn blank_input_is_not_sent() {
        let client = ChatClient::new("http://127.0.0.1:9", "anon").unwrap();
        assert!(client.ask("   ").await.is_none());
    }
}
