use adapter::{AdapterError, IdentityProvider};
use async_trait::async_trait;
use domain::{AuthEvent, Identity, Session, UserMetadata};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use url::Url;

pub fn session(name: Option<&str>) -> Session {
    Session {
        access_token: "jwt".into(),
        refresh_token: None,
        expires_at: None,
        user: Identity {
            id: "user-1".into(),
            email: None,
            metadata: UserMetadata {
                full_name: name.map(Into::into),
                ..Default::default()
            },
        },
    }
}

pub struct FakeProvider {
    pub session: Mutex<Option<Session>>,
    pub events: broadcast::Sender<AuthEvent>,
}

impl FakeProvider {
    pub fn new(session: Option<Session>) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(session),
            events: broadcast::channel(8).0,
        })
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn get_session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn sign_in_with_oauth(&self, provider: &str) -> Result<Url, AdapterError> {
        Ok(Url::parse(&format!(
            "https://auth.example.com/authorize?provider={}",
            provider
        ))?)
    }

    async fn sign_out(&self) -> Result<(), AdapterError> {
        *self.session.lock().await = None;
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }
}
