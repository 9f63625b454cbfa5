use adapter::{AdapterError, IdentityProvider};
use domain::text::escape_html;
use domain::{AuthEvent, Identity};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(Identity),
}

impl AuthState {
    pub fn from_event(event: &AuthEvent) -> Self {
        match event.session() {
            Some(session) => AuthState::Authenticated(session.user.clone()),
            None => AuthState::Anonymous,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAffordance {
    SignIn,
    SignOut { display_name: String },
}

impl AuthAffordance {
    pub fn to_html(&self) -> String {
        match self {
            AuthAffordance::SignIn => concat!(
                r#"<button type="button" class="btn primary-btn auth-sign-in-google" "#,
                r#"aria-label="Sign in with Google">Sign in with Google</button>"#
            )
            .to_string(),
            AuthAffordance::SignOut { display_name } => format!(
                concat!(
                    r#"<span class="auth-user">{}</span> "#,
                    r#"<button type="button" class="btn secondary-btn auth-sign-out" "#,
                    r#"aria-label="Sign out">Sign out</button>"#
                ),
                escape_html(display_name)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormUi {
    pub visible: bool,
    pub enabled: bool,
    pub transition: Option<Transition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateView {
    pub affordance: AuthAffordance,
    pub form: FormUi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Reload,
}

pub struct CapabilityGate {
    state: watch::Sender<AuthState>,
    animate: bool,
}

impl CapabilityGate {
    pub fn new(animate: bool) -> Self {
        let (state, _) = watch::channel(AuthState::Anonymous);
        Self { state, animate }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn can_submit(&self) -> bool {
        self.state.borrow().is_signed_in()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn view(&self) -> GateView {
        self.view_for(&self.state.borrow(), None)
    }

    fn view_for(&self, state: &AuthState, transition: Option<Transition>) -> GateView {
        let affordance = match state {
            AuthState::Anonymous => AuthAffordance::SignIn,
            AuthState::Authenticated(identity) => AuthAffordance::SignOut {
                display_name: identity.display_name().to_string(),
            },
        };
        let signed_in = state.is_signed_in();
        GateView {
            affordance,
            form: FormUi {
                visible: signed_in,
                enabled: signed_in,
                transition,
            },
        }
    }

    pub fn apply(&self, event: &AuthEvent) -> GateView {
        let next = AuthState::from_event(event);
        let was_signed_in = self.state.borrow().is_signed_in();
        let transition = match (self.animate, was_signed_in, next.is_signed_in()) {
            (true, false, true) => Some(Transition::Enter),
            (true, true, false) => Some(Transition::Exit),
            _ => None,
        };
        let view = self.view_for(&next, transition);
        self.state.send_replace(next);
        view
    }

    pub async fn run<F>(&self, provider: Arc<dyn IdentityProvider>, cancel: CancellationToken, mut on_change: F)
    where
        F: FnMut(GateView) + Send,
    {
        let mut events = BroadcastStream::new(provider.subscribe());
        let initial = AuthEvent::InitialSession(provider.get_session().await);
        on_change(self.apply(&initial));

        loop {
            tokio::select! {
                next = events.next() => match next {
                    Some(Ok(event)) => on_change(self.apply(&event)),
                    Some(Err(lagged)) => {
                        warn!("Auth events lagged ({}), re-reading session", lagged);
                        let event = AuthEvent::InitialSession(provider.get_session().await);
                        on_change(self.apply(&event));
                    }
                    None => break,
                },
                _ = cancel.cancelled() => break,
            }
        }
    }

    pub async fn sign_out(&self, provider: &dyn IdentityProvider) -> Result<PageAction, AdapterError> {
        provider.sign_out().await?;
        self.state.send_replace(AuthState::Anonymous);
        info!("Signed out, reloading page");
        Ok(PageAction::Reload)
    }
}
