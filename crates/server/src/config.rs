use config::ConfigError;
use domain::DisplayClock;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;
use widget::VerificationConfig;

const ENV_PREFIX: &str = "FOLIO_";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub verification: VerificationSettings,
    pub preview: PreviewSettings,
    pub display: DisplaySettings,
    pub chat: ChatSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct StoreSettings {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct VerificationSettings {
    pub site_key: Option<String>,
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PreviewSettings {
    pub endpoint: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DisplaySettings {
    pub utc_offset_minutes: i32,
    pub timezone_label: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ChatSettings {
    pub api_key: Option<String>,
    pub upstream_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCredentials<'a> {
    pub url: &'a str,
    pub anon_key: &'a str,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::build(&run_mode, collect_env_vars(std::env::vars()))
    }

    fn build(run_mode: &str, env: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.cors_origins", "*")?
            .set_default("verification.poll_interval_ms", 500)?
            .set_default("verification.max_attempts", 20)?
            .set_default("preview.endpoint", adapter::MICROLINK_ENDPOINT)?
            .set_default("display.utc_offset_minutes", 0)?
            .set_default("display.timezone_label", "UTC")?
            .set_default("chat.upstream_url", crate::chat::OPENAI_CHAT_URL)?
            .set_default("chat.model", crate::chat::DEFAULT_MODEL)?
            .set_default("chat.max_tokens", crate::chat::DEFAULT_MAX_TOKENS as i64)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false));

        for (key, value) in env {
            builder = builder.set_override(key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn store_credentials(&self) -> Option<StoreCredentials<'_>> {
        match (non_blank(&self.store.url), non_blank(&self.store.anon_key)) {
            (Some(url), Some(anon_key)) => Some(StoreCredentials { url, anon_key }),
            _ => None,
        }
    }

    pub fn verification_config(&self) -> VerificationConfig {
        let site_key = non_blank(&self.verification.site_key).map(str::to_string);
        VerificationConfig {
            site_key,
            poll_interval: Duration::from_millis(self.verification.poll_interval_ms),
            max_attempts: self.verification.max_attempts,
            ..Default::default()
        }
    }

    pub fn clock(&self) -> DisplayClock {
        DisplayClock::from_minutes(
            self.display.utc_offset_minutes,
            non_blank(&self.display.timezone_label).map(str::to_string),
        )
    }

    pub fn chat_api_key(&self) -> Option<&str> {
        non_blank(&self.chat.api_key)
    }

    pub fn disabled_features(&self) -> Vec<&'static str> {
        let mut disabled = Vec::new();
        if self.store_credentials().is_none() {
            disabled.push("comments");
        }
        if non_blank(&self.verification.site_key).is_none() {
            disabled.push("verification");
        }
        if self.chat_api_key().is_none() {
            disabled.push("chat");
        }
        disabled
    }

    pub fn warn_missing(&self) {
        for feature in self.disabled_features() {
            match feature {
                "comments" => warn!("Store URL or anon key missing, comments are disabled"),
                "verification" => warn!("Verification site key missing, bot verification is disabled"),
                _ => warn!("Chat API key missing, /functions/v1/chat will answer 500"),
            }
        }
    }
}

/// `FOLIO_CHAT__API_KEY=...` becomes `chat.api_key`.
fn collect_env_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        // Bare prefixed names like FOLIO_ACCESS_TOKEN belong to the client binary.
        .filter(|(k, _)| k.contains('.'))
        .collect()
}

pub fn public_globals(settings: &Settings) -> Map<String, Value> {
    let mut globals = Map::new();
    let entries = [
        ("__STORE_URL__", non_blank(&settings.store.url)),
        ("__STORE_ANON_KEY__", non_blank(&settings.store.anon_key)),
        ("__VERIFICATION_SITE_KEY__", non_blank(&settings.verification.site_key)),
    ];
    for (name, value) in entries {
        globals.insert(name.to_string(), Value::from(value.unwrap_or_default()));
    }
    globals
}
