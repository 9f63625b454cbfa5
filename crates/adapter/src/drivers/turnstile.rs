use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::traits::{VerificationWidget, WidgetId, WidgetOptions, WidgetSignal};

// Single use: after `reset` there is no token left to issue.
pub struct ProvidedTokenWidget {
    token: Mutex<Option<String>>,
    renders: AtomicUsize,
}

impl ProvidedTokenWidget {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token.filter(|t| !t.trim().is_empty())),
            renders: AtomicUsize::new(0),
        }
    }
}

impl VerificationWidget for ProvidedTokenWidget {
    fn is_loaded(&self) -> bool {
        true
    }

    fn render(&self, container: &str, options: WidgetOptions) -> Option<WidgetId> {
        let n = self.renders.fetch_add(1, Ordering::SeqCst);
        let token = self.token.lock().ok().and_then(|t| t.clone());
        let signal = match token {
            Some(token) => WidgetSignal::Token(token),
            None => WidgetSignal::Error,
        };
        let _ = options.signals.send(signal);
        Some(WidgetId(format!("{}-{}", container, n)))
    }

    fn reset(&self, _id: &WidgetId) {
        if let Ok(mut token) = self.token.lock() {
            *token = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn issues_token_once() {
        let widget = ProvidedTokenWidget::new(Some("tok".into()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = widget
            .render(
                "cf-turnstile",
                WidgetOptions {
                    sitekey: "site".into(),
                    signals: tx.clone(),
                },
            )
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), WidgetSignal::Token("tok".into()));

        widget.reset(&id);
        widget.render(
            "cf-turnstile",
            WidgetOptions {
                sitekey: "site".into(),
                signals: tx,
            },
        );
        assert_eq!(rx.try_recv().unwrap(), WidgetSignal::Error);
    }
}
