use crate::models::Session;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "session", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession(Option<Session>),
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
    UserUpdated(Session),
}

impl AuthEvent {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::InitialSession(s) => s.as_ref(),
            AuthEvent::SignedIn(s) | AuthEvent::TokenRefreshed(s) | AuthEvent::UserUpdated(s) => {
                Some(s)
            }
            AuthEvent::SignedOut => None,
        }
    }
}
