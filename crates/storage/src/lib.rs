use std::time::Duration;

mod backend;
mod client;
mod columns;
mod error;
mod models;
mod repo;

pub use backend::CommentBackend;
pub use client::CommentsClient;
pub use columns::{is_schema_mismatch, ColumnSet, ColumnStrategy, BASE_COLUMNS, STYLE_COLUMNS};
pub use error::{LoadFailure, StoreError, SubmitError};

pub const COMMENTS_TABLE: &str = "comments";

#[derive(Clone)]
pub struct RestStore {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, anon_key: &str) -> anyhow::Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() || anon_key.trim().is_empty() {
            anyhow::bail!("store url and anon key are both required");
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            base_url,
            anon_key: anon_key.trim().to_string(),
        })
    }

    pub(crate) fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}
