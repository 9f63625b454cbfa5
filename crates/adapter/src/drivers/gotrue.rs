use async_trait::async_trait;
use domain::{AuthEvent, Identity, Session};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};
use url::Url;

use crate::common::pkce;
use crate::error::AdapterError;
use crate::traits::IdentityProvider;

const EVENT_BUFFER: usize = 16;

pub struct GoTrueAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    redirect_to: Option<String>,
    session: RwLock<Option<Session>>,
    pkce_verifier: Mutex<Option<String>>,
    events: broadcast::Sender<AuthEvent>,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct PkceBody<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

impl GoTrueAuth {
    pub fn new(base_url: &str, anon_key: &str, redirect_to: Option<String>) -> anyhow::Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Ok(Self {
            http,
            base_url,
            anon_key: anon_key.to_string(),
            redirect_to,
            session: RwLock::new(None),
            pkce_verifier: Mutex::new(None),
            events,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn with_key(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn store(&self, session: Option<Session>, event: AuthEvent) {
        *self.session.write().await = session;
        self.emit(event);
    }

    /// Adopts an existing access token (e.g. from a redirect fragment) after
    /// checking it with the auth service, then announces the initial state.
    pub async fn restore(
        &self,
        access_token: &str,
        refresh_token: Option<String>,
    ) -> Result<Session, AdapterError> {
        let resp = self
            .with_key(self.http.get(self.endpoint("user")))
            .bearer_auth(access_token)
            .send()
            .await?;
        let user: Identity = read_json(resp).await?;
        let session = Session {
            access_token: access_token.to_string(),
            refresh_token,
            expires_at: None,
            user,
        };
        info!("Restored session for {}", session.user.display_name());
        self.store(
            Some(session.clone()),
            AuthEvent::InitialSession(Some(session.clone())),
        )
        .await;
        Ok(session)
    }

    pub async fn start_anonymous(&self) {
        self.store(None, AuthEvent::InitialSession(None)).await;
    }

    pub async fn exchange_code(&self, auth_code: &str) -> Result<Session, AdapterError> {
        let verifier = self
            .pkce_verifier
            .lock()
            .map_err(|_| AdapterError::Malformed("pkce state poisoned".into()))?
            .take()
            .ok_or(AdapterError::NotSignedIn)?;
        let resp = self
            .with_key(self.http.post(self.endpoint("token")))
            .query(&[("grant_type", "pkce")])
            .json(&PkceBody {
                auth_code,
                code_verifier: &verifier,
            })
            .send()
            .await?;
        let session: Session = read_json(resp).await?;
        self.store(Some(session.clone()), AuthEvent::SignedIn(session.clone()))
            .await;
        Ok(session)
    }

    pub async fn refresh(&self) -> Result<Session, AdapterError> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or(AdapterError::NotSignedIn)?;
        let resp = self
            .with_key(self.http.post(self.endpoint("token")))
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshBody {
                refresh_token: &refresh_token,
            })
            .send()
            .await?;
        let session: Session = read_json(resp).await?;
        self.store(
            Some(session.clone()),
            AuthEvent::TokenRefreshed(session.clone()),
        )
        .await;
        Ok(session)
    }

    pub fn authorize_url(&self, provider: &str, challenge: &str) -> Result<Url, AdapterError> {
        let mut url = Url::parse(&self.endpoint("authorize"))?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("provider", provider);
            if let Some(redirect) = &self.redirect_to {
                q.append_pair("redirect_to", redirect);
            }
            q.append_pair("code_challenge", challenge);
            q.append_pair("code_challenge_method", "s256");
        }
        Ok(url)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, AdapterError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(AdapterError::Status {
            status: status.as_u16(),
            message,
        });
    }
    resp.json::<T>()
        .await
        .map_err(|e| AdapterError::Malformed(e.to_string()))
}

#[async_trait]
impl IdentityProvider for GoTrueAuth {
    async fn get_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn sign_in_with_oauth(&self, provider: &str) -> Result<Url, AdapterError> {
        let verifier = pkce::generate_verifier();
        let url = self.authorize_url(provider, &pkce::challenge(&verifier))?;
        if let Ok(mut slot) = self.pkce_verifier.lock() {
            *slot = Some(verifier);
        }
        Ok(url)
    }

    async fn sign_out(&self) -> Result<(), AdapterError> {
        let token = self.session.read().await.as_ref().map(|s| s.access_token.clone());
        if let Some(token) = token {
            let resp = self
                .with_key(self.http.post(self.endpoint("logout")))
                .bearer_auth(token)
                .send()
                .await?;
            let status = resp.status();
            // 401/404 mean the session is already gone on the server.
            if !status.is_success() && status.as_u16() != 401 && status.as_u16() != 404 {
                warn!("Sign-out rejected with HTTP {}", status);
                return Err(AdapterError::Status {
                    status: status.as_u16(),
                    message: resp.text().await.unwrap_or_default(),
                });
            }
        }
        self.store(None, AuthEvent::SignedOut).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> GoTrueAuth {
        GoTrueAuth::new(
            "https://demo.supabase.co/",
            "anon",
            Some("https://me.dev/#comments".into()),
        )
        .unwrap()
    }

    #[test]
    fn authorize_url_carries_pkce_challenge() {
        let auth = auth();
        let url = auth.sign_in_with_oauth("google").unwrap();
        assert_eq!(url.path(), "/auth/v1/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("provider".into(), "google".into())));
        assert!(pairs.contains(&("redirect_to".into(), "https://me.dev/#comments".into())));
        assert!(pairs.contains(&("code_challenge_method".into(), "s256".into())));

        let verifier = auth.pkce_verifier.lock().unwrap().clone().unwrap();
        let challenge = pairs
            .iter()
            .find(|(k, _)| k == "code_challenge")
            .map(|(_, v)| v.clone())
            .unwrap();
        assert_eq!(challenge, pkce::challenge(&verifier));
    }

    #[tokio::test]
    async fn anonymous_start_and_sign_out_emit_events() {
        let auth = auth();
        let mut rx = auth.subscribe();

        auth.start_anonymous().await;
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::InitialSession(None));

        // Without a session there is nothing to revoke remotely.
        auth.sign_out().await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::SignedOut);
        assert!(auth.get_session().await.is_none());
    }

    #[test]
    fn rejects_garbage_base_url() {
        assert!(GoTrueAuth::new("not a url", "anon", None).is_err());
    }
}
