use async_trait::async_trait;
use domain::{AuthEvent, Session};
use tokio::sync::{broadcast, mpsc};
use url::Url;

use crate::error::AdapterError;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_session(&self) -> Option<Session>;

    /// Every later session change. Subscribers should call `get_session`
    /// first for the initial state.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    fn sign_in_with_oauth(&self, provider: &str) -> Result<Url, AdapterError>;

    async fn sign_out(&self) -> Result<(), AdapterError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMetadata {
    pub image: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl LinkMetadata {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.title.is_none() && self.description.is_none()
    }
}

#[async_trait]
pub trait LinkMetadataService: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<LinkMetadata, AdapterError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidgetId(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetSignal {
    Token(String),
    Expired,
    Error,
}

#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub sitekey: String,
    pub signals: mpsc::UnboundedSender<WidgetSignal>,
}

pub trait VerificationWidget: Send + Sync {
    fn is_loaded(&self) -> bool;
    fn render(&self, container: &str, options: WidgetOptions) -> Option<WidgetId>;
    fn reset(&self, id: &WidgetId);
}
