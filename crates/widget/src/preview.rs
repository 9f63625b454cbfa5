use adapter::LinkMetadataService;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::render::PreviewRequest;
use crate::view::SharedView;

// Every failure is swallowed, the slot just stays a bare link.
#[derive(Clone)]
pub struct PreviewFetcher {
    service: Arc<dyn LinkMetadataService>,
}

impl PreviewFetcher {
    pub fn new(service: Arc<dyn LinkMetadataService>) -> Self {
        Self { service }
    }

    pub async fn fetch_preview(&self, view: &SharedView, request: PreviewRequest) -> bool {
        let meta = match self.service.resolve(&request.url).await {
            Ok(meta) => meta,
            Err(e) => {
                debug!("Preview for {} failed: {}", request.url, e);
                return false;
            }
        };
        if meta.is_empty() {
            return false;
        }

        let applied = view.lock().await.apply_preview(request.slot, &meta);
        if !applied {
            debug!("Preview slot for {} is gone, dropping result", request.url);
        }
        applied
    }

    pub fn spawn_all(&self, view: &SharedView, requests: Vec<PreviewRequest>) -> Vec<JoinHandle<bool>> {
        requests
            .into_iter()
            .map(|request| {
                let fetcher = self.clone();
                let view = view.clone();
                tokio::spawn(async move { fetcher.fetch_preview(&view, request).await })
            })
            .collect()
    }
}
