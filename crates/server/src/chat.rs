use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::protocol::ChatErrorBody;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

use crate::config::ChatSettings;

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const EMPTY_REPLY: &str = "I couldn't generate a reply.";
const GENERIC_UPSTREAM_ERROR: &str = "AI service error";
const RAW_ERROR_MAX_LEN: usize = 200;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant representing the portfolio owner. \
Answer questions about their work, projects, and background based on the following context. \
If asked something outside this context, say you don't have that information and suggest they \
reach out via the contact section.

Context:
- Name: Your Name (replace with actual name in production)
- Tagline: Frontend developer crafting clean, user-friendly experiences.
- Projects: Project One (HTML, CSS, JavaScript), Project Two (HTML, CSS), Project Three (HTML, CSS, React), \
Project Four (HTML, CSS, Node.js). Each has a brief description on the portfolio.
- About: The person enjoys building clean, accessible interfaces, solving real problems with simple \
solutions, and collaborating with designers and engineers. They are open to opportunities.
- Contact: Twitter and LinkedIn links are on the portfolio.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("OpenAI API key not configured")]
    NotConfigured,
    #[error("Invalid JSON body")]
    InvalidJson,
    #[error("message must be a non-empty string (max 500 chars)")]
    InvalidMessage,
    #[error("upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed upstream reply: {0}")]
    Malformed(String),
}

impl ChatError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ChatError::InvalidJson | ChatError::InvalidMessage => StatusCode::BAD_REQUEST,
            ChatError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ChatError::NotConfigured | ChatError::Transport(_) | ChatError::Malformed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn body(&self) -> ChatErrorBody {
        match self {
            ChatError::Upstream { status, message } => ChatErrorBody {
                error: message.clone(),
                status: Some(*status),
            },
            ChatError::Transport(_) | ChatError::Malformed(_) => ChatErrorBody {
                error: "Internal server error".to_string(),
                status: None,
            },
            other => ChatErrorBody {
                error: other.to_string(),
                status: None,
            },
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            error!("Chat request failed: {}", self);
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, message: &str) -> Result<String, ChatError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiCompletion {
    http: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiCompletion {
    pub fn new(api_key: &str, settings: &ChatSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            url: settings.upstream_url.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }
}

#[async_trait]
impl Completion for OpenAiCompletion {
    async fn complete(&self, message: &str) -> Result<String, ChatError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            error!("OpenAI error: {} {}", status, text);
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                message: upstream_error_message(&text),
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| ChatError::Malformed(e.to_string()))?;
        Ok(reply_or_fallback(parsed))
    }
}

fn reply_or_fallback(resp: CompletionResponse) -> String {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| EMPTY_REPLY.to_string())
}

/// `error.message` or `message` from a JSON error body. A body that is not
/// JSON is passed through only when it is short.
pub fn upstream_error_message(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => {
            let field = |path: &str| json.pointer(path).and_then(Value::as_str).filter(|m| !m.is_empty());
            field("/error/message")
                .or_else(|| field("/message"))
                .unwrap_or(GENERIC_UPSTREAM_ERROR)
                .to_string()
        }
        Err(_) if text.len() < RAW_ERROR_MAX_LEN => text.to_string(),
        Err(_) => GENERIC_UPSTREAM_ERROR.to_string(),
    }
}
