use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use domain::protocol::{ChatReply, CHAT_MESSAGE_MAX_CHARS};
use serde_json::Value;
use tracing::debug;

use crate::chat::ChatError;
use crate::state::AppState;

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatReply>, ChatError> {
    let completion = state.chat.as_ref().ok_or(ChatError::NotConfigured)?;

    let body = body.map_err(|rejection| {
        debug!("Chat body rejected: {}", rejection);
        // Over-limit bodies count as over-long messages.
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ChatError::InvalidMessage
        } else {
            ChatError::InvalidJson
        }
    })?;

    let payload: Value = serde_json::from_slice(&body).map_err(|_| ChatError::InvalidJson)?;
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if message.is_empty() || message.chars().count() > CHAT_MESSAGE_MAX_CHARS {
        return Err(ChatError::InvalidMessage);
    }

    debug!("Chat message of {} chars", message.chars().count());
    let reply = completion.complete(message).await?;
    Ok(Json(ChatReply { reply }))
}

pub async fn method_not_allowed() -> ChatError {
    ChatError::MethodNotAllowed
}
