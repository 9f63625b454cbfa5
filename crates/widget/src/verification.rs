use adapter::{VerificationWidget, WidgetId, WidgetOptions, WidgetSignal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const DEFAULT_CONTAINER: &str = "cf-turnstile";

#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// Without a site key verification is off and submits never wait for a token.
    pub site_key: Option<String>,
    pub poll_interval: Duration,
    pub max_attempts: u32,
    pub container: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            site_key: None,
            poll_interval: Duration::from_millis(500),
            max_attempts: 20,
            container: DEFAULT_CONTAINER.to_string(),
        }
    }
}

pub struct VerificationGate {
    config: VerificationConfig,
    widget: Option<Arc<dyn VerificationWidget>>,
    widget_id: Option<WidgetId>,
    token: Option<String>,
    tx: mpsc::UnboundedSender<WidgetSignal>,
    rx: mpsc::UnboundedReceiver<WidgetSignal>,
}

impl VerificationGate {
    pub fn new(config: VerificationConfig, widget: Option<Arc<dyn VerificationWidget>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            widget,
            widget_id: None,
            token: None,
            tx,
            rx,
        }
    }

    pub fn disabled() -> Self {
        Self::new(VerificationConfig::default(), None)
    }

    pub fn required(&self) -> bool {
        self.site_key().is_some()
    }

    fn site_key(&self) -> Option<&str> {
        self.config.site_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn widget_id(&self) -> Option<&WidgetId> {
        self.widget_id.as_ref()
    }

    pub async fn attach(&mut self) -> bool {
        let Some(sitekey) = self.site_key().map(str::to_string) else {
            debug!("No verification site key, widget stays hidden");
            return false;
        };
        let Some(widget) = self.widget.clone() else {
            warn!("Verification site key set but no widget available");
            return false;
        };

        for attempt in 1..=self.config.max_attempts {
            if widget.is_loaded() {
                let options = WidgetOptions {
                    sitekey,
                    signals: self.tx.clone(),
                };
                self.widget_id = widget.render(&self.config.container, options);
                info!("Verification widget rendered after {} attempt(s)", attempt);
                return self.widget_id.is_some();
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        warn!(
            "Verification widget did not load after {} attempts",
            self.config.max_attempts
        );
        false
    }

    pub fn token(&mut self) -> Option<String> {
        while let Ok(signal) = self.rx.try_recv() {
            match signal {
                WidgetSignal::Token(token) => self.token = Some(token),
                WidgetSignal::Expired | WidgetSignal::Error => self.token = None,
            }
        }
        self.token.clone()
    }

    pub fn reset(&mut self) {
        self.token();
        self.token = None;
        if let (Some(widget), Some(id)) = (&self.widget, &self.widget_id) {
            widget.reset(id);
        }
    }
}
