use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AdapterError;
use crate::traits::{LinkMetadata, LinkMetadataService};

pub const DEFAULT_ENDPOINT: &str = "https://api.microlink.io";

#[derive(Clone)]
pub struct MicrolinkClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct Envelope {
    data: Option<Data>,
}

#[derive(Deserialize)]
struct Data {
    #[serde(default)]
    image: Option<Image>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

// The service sends `{ "url": ... }` objects, some mirrors send a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Image {
    Url(String),
    Object { url: Option<String> },
}

impl MicrolinkClient {
    pub fn new(endpoint: &str) -> Result<Self, AdapterError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn parse_metadata(body: &[u8]) -> Result<LinkMetadata, AdapterError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| AdapterError::Malformed(e.to_string()))?;
    let data = envelope
        .data
        .ok_or_else(|| AdapterError::Malformed("missing data".into()))?;

    let image = match data.image {
        Some(Image::Url(u)) => Some(u),
        Some(Image::Object { url }) => url,
        None => None,
    };
    Ok(LinkMetadata {
        image: non_blank(image),
        title: non_blank(data.title),
        description: non_blank(data.description),
    })
}

#[async_trait]
impl LinkMetadataService for MicrolinkClient {
    async fn resolve(&self, url: &str) -> Result<LinkMetadata, AdapterError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("url", url), ("screenshot", "false")])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
                message: "metadata lookup failed".into(),
            });
        }
        let body = resp.bytes().await?;
        parse_metadata(&body)
    }
}
