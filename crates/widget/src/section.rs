use adapter::IdentityProvider;
use domain::{CommentBody, CommentStyle};
use futures::future::join_all;
use std::sync::Arc;
use storage::{CommentBackend, CommentsClient, SubmitError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::gate::GateView;
use crate::preview::PreviewFetcher;
use crate::render::RenderPipeline;
use crate::verification::VerificationGate;
use crate::view::{CommentListView, SharedView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentForm {
    pub draft: String,
    pub background_color: Option<String>,
    pub font_family: Option<String>,
    pub visible: bool,
    pub submit_enabled: bool,
}

impl Default for CommentForm {
    fn default() -> Self {
        Self {
            draft: String::new(),
            background_color: None,
            font_family: None,
            visible: false,
            submit_enabled: true,
        }
    }
}

impl CommentForm {
    pub fn style(&self) -> CommentStyle {
        CommentStyle::from_raw(self.background_color.as_deref(), self.font_family.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Empty,
    NotSignedIn,
    VerificationPending,
    Failed,
    Posted,
}

pub struct CommentSection<B> {
    client: CommentsClient<B>,
    pipeline: RenderPipeline,
    view: SharedView,
    previews: Option<PreviewFetcher>,
    verification: VerificationGate,
    identity: Arc<dyn IdentityProvider>,
    form: CommentForm,
    pending_previews: Vec<JoinHandle<bool>>,
}

impl<B: CommentBackend> CommentSection<B> {
    pub fn new(
        client: CommentsClient<B>,
        pipeline: RenderPipeline,
        identity: Arc<dyn IdentityProvider>,
        verification: VerificationGate,
    ) -> Self {
        let client = client.require_verification(verification.required());
        Self {
            client,
            pipeline,
            view: CommentListView::shared(),
            previews: None,
            verification,
            identity,
            form: CommentForm::default(),
            pending_previews: Vec::new(),
        }
    }

    pub fn with_previews(mut self, previews: PreviewFetcher) -> Self {
        self.previews = Some(previews);
        self
    }

    pub fn view(&self) -> SharedView {
        self.view.clone()
    }

    pub fn form(&self) -> &CommentForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CommentForm {
        &mut self.form
    }

    pub fn verification(&self) -> &VerificationGate {
        &self.verification
    }

    pub async fn mount(&mut self) {
        self.verification.attach().await;
        self.load().await;
    }

    pub fn apply_gate(&mut self, gate: &GateView) {
        self.form.visible = gate.form.visible;
        self.form.submit_enabled = gate.form.enabled;
    }

    pub async fn load(&mut self) {
        let comments = match self.client.load_comments().await {
            Ok(comments) => comments,
            Err(e) => {
                warn!("Failed to load comments: {}", e);
                self.view.lock().await.show_error();
                return;
            }
        };

        let requests = {
            let mut view = self.view.lock().await;
            self.pipeline.render(&mut view, &comments)
        };
        debug!("Rendered {} comments, {} previews pending", comments.len(), requests.len());

        if let Some(fetcher) = &self.previews {
            self.pending_previews.retain(|handle| !handle.is_finished());
            self.pending_previews.extend(fetcher.spawn_all(&self.view, requests));
        }
    }

    pub async fn wait_for_previews(&mut self) -> usize {
        join_all(self.pending_previews.drain(..))
            .await
            .into_iter()
            .filter(|done| matches!(done, Ok(true)))
            .count()
    }

    // body, session, token, insert. Failures only re-enable the form.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if CommentBody::parse(&self.form.draft).is_err() {
            return SubmitOutcome::Empty;
        }

        self.form.submit_enabled = false;
        let session = self.identity.get_session().await;
        let token = self.verification.token();

        let result = self
            .client
            .submit_comment(&self.form.draft, self.form.style(), session.as_ref(), token.as_deref())
            .await;

        match result {
            Ok(_) => {
                info!("Comment posted, reloading list");
                self.form.draft.clear();
                self.verification.reset();
                self.form.submit_enabled = true;
                self.load().await;
                SubmitOutcome::Posted
            }
            Err(e) => {
                self.form.submit_enabled = true;
                debug!("Submit stopped: {}", e);
                match e {
                    SubmitError::EmptyBody => SubmitOutcome::Empty,
                    SubmitError::NoSession => SubmitOutcome::NotSignedIn,
                    SubmitError::VerificationMissing => SubmitOutcome::VerificationPending,
                    SubmitError::Store(_) => SubmitOutcome::Failed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{session, FakeProvider};
    use crate::verification::VerificationConfig;
    use crate::view::{ListState, EMPTY_PLACEHOLDER, ERROR_PLACEHOLDER};
    use adapter::{AdapterError, LinkMetadata, LinkMetadataService, ProvidedTokenWidget};
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use domain::{Comment, CommentId, DisplayClock, NewComment};
    use std::sync::Mutex;
    use std::time::Duration;
    use storage::{ColumnSet, StoreError};

    #[derive(Default)]
    struct MemoryBackend {
        rows: Mutex<Vec<Comment>>,
        selects: Mutex<usize>,
        inserts: Mutex<Vec<NewComment>>,
        fail_selects: bool,
        fail_inserts: bool,
    }

    #[async_trait]
    impl CommentBackend for MemoryBackend {
        async fn select(&self, _columns: &ColumnSet) -> Result<Vec<Comment>, StoreError> {
            *self.selects.lock().unwrap() += 1;
            if self.fail_selects {
                return Err(StoreError::Transport("connection refused".into()));
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn insert(&self, row: &NewComment, _token: &str) -> Result<Vec<Comment>, StoreError> {
            self.inserts.lock().unwrap().push(row.clone());
            if self.fail_inserts {
                return Err(StoreError::Rejected {
                    status: 403,
                    code: Some("42501".into()),
                    message: "permission denied".into(),
                });
            }
            let mut rows = self.rows.lock().unwrap();
            let stored = Comment {
                id: CommentId::new(format!("c{}", rows.len() + 1)),
                author_name: Some(row.author_name.clone()),
                body: Some(row.body.clone()),
                created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap()
                    + ChronoDuration::seconds(rows.len() as i64),
                background_color: row.background_color.as_ref().map(|c| c.to_string()),
                font_family: row.font_family.map(|f| f.to_string()),
            };
            rows.push(stored.clone());
            Ok(vec![stored])
        }
    }

    struct StaticPreview;

    #[async_trait]
    impl LinkMetadataService for StaticPreview {
        async fn resolve(&self, _url: &str) -> Result<LinkMetadata, AdapterError> {
            Ok(LinkMetadata {
                title: Some("Example Domain".into()),
                ..Default::default()
            })
        }
    }

    fn section(backend: MemoryBackend, signed_in: bool) -> CommentSection<MemoryBackend> {
        section_with(backend, signed_in, VerificationGate::disabled())
    }

    fn section_with(
        backend: MemoryBackend,
        signed_in: bool,
        verification: VerificationGate,
    ) -> CommentSection<MemoryBackend> {
        let identity = FakeProvider::new(signed_in.then(|| session(Some("Ada"))));
        CommentSection::new(
            CommentsClient::new(backend),
            RenderPipeline::new(DisplayClock::utc()),
            identity,
            verification,
        )
    }

    fn backend(section: &CommentSection<MemoryBackend>) -> &MemoryBackend {
        section.client.backend()
    }

    #[tokio::test]
    async fn load_failure_shows_error_placeholder() {
        let mut s = section(
            MemoryBackend {
                fail_selects: true,
                ..Default::default()
            },
            false,
        );
        s.load().await;
        assert_eq!(s.view().lock().await.to_html(), ERROR_PLACEHOLDER);
    }

    #[tokio::test]
    async fn empty_store_shows_empty_placeholder() {
        let mut s = section(MemoryBackend::default(), false);
        s.load().await;
        assert_eq!(s.view().lock().await.to_html(), EMPTY_PLACEHOLDER);
    }

    #[tokio::test]
    async fn blank_draft_issues_no_request() {
        let mut s = section(MemoryBackend::default(), true);
        s.form_mut().draft = "  \n\t ".into();

        assert_eq!(s.submit().await, SubmitOutcome::Empty);
        assert!(backend(&s).inserts.lock().unwrap().is_empty());
        assert_eq!(*backend(&s).selects.lock().unwrap(), 0);
        assert!(s.form().submit_enabled);
        assert_eq!(s.form().draft, "  \n\t ");
    }

    #[tokio::test]
    async fn signed_out_submit_is_a_no_op() {
        let mut s = section(MemoryBackend::default(), false);
        s.form_mut().draft = "hello".into();

        assert_eq!(s.submit().await, SubmitOutcome::NotSignedIn);
        assert!(backend(&s).inserts.lock().unwrap().is_empty());
        assert!(s.form().submit_enabled);
        assert_eq!(s.form().draft, "hello");
    }

    #[tokio::test]
    async fn missing_verification_token_blocks_insert() {
        let config = VerificationConfig {
            site_key: Some("site".into()),
            poll_interval: Duration::from_millis(1),
            max_attempts: 1,
            ..Default::default()
        };
        let widget = Arc::new(ProvidedTokenWidget::new(None));
        let mut s = section_with(
            MemoryBackend::default(),
            true,
            VerificationGate::new(config, Some(widget)),
        );
        s.mount().await;
        s.form_mut().draft = "hello".into();

        assert_eq!(s.submit().await, SubmitOutcome::VerificationPending);
        assert!(backend(&s).inserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn posted_comment_round_trips_with_styling() {
        let config = VerificationConfig {
            site_key: Some("site".into()),
            poll_interval: Duration::from_millis(1),
            max_attempts: 1,
            ..Default::default()
        };
        let widget = Arc::new(ProvidedTokenWidget::new(Some("tok".into())));
        let mut s = section_with(
            MemoryBackend::default(),
            true,
            VerificationGate::new(config, Some(widget)),
        );
        s.mount().await;

        let form = s.form_mut();
        form.draft = "  styled hello  ".into();
        form.background_color = Some("#1a2b3c".into());
        form.font_family = Some("Lora".into());

        assert_eq!(s.submit().await, SubmitOutcome::Posted);
        assert!(s.form().draft.is_empty());
        assert!(s.form().submit_enabled);
        // Single-use token is gone after the reset.
        assert_eq!(s.verification.token(), None);
        // Mount plus the reload after insert.
        assert_eq!(*backend(&s).selects.lock().unwrap(), 2);

        let view = s.view();
        let view = view.lock().await;
        let item = &view.items()[0];
        assert!(item.inner_html.contains("styled hello"));
        assert!(item.inner_html.contains(">Ada<"));
        let style = item.style.as_deref().unwrap();
        assert!(style.contains("background-color: #1a2b3c;"));
        assert!(style.contains("font-family: Lora, serif;"));
    }

    #[tokio::test]
    async fn store_failure_keeps_draft_and_reenables() {
        let mut s = section(
            MemoryBackend {
                fail_inserts: true,
                ..Default::default()
            },
            true,
        );
        s.load().await;
        let before = s.view().lock().await.to_html();
        s.form_mut().draft = "hello".into();

        assert_eq!(s.submit().await, SubmitOutcome::Failed);
        assert_eq!(backend(&s).inserts.lock().unwrap().len(), 1);
        assert!(s.form().submit_enabled);
        assert_eq!(s.form().draft, "hello");
        // No reload, no message.
        assert_eq!(*backend(&s).selects.lock().unwrap(), 1);
        assert_eq!(s.view().lock().await.to_html(), before);
    }

    #[tokio::test]
    async fn previews_fill_after_load() {
        let rows = vec![Comment {
            id: CommentId::new("a"),
            author_name: None,
            body: Some("see https://example.com".into()),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            background_color: None,
            font_family: None,
        }];
        let mut s = section(
            MemoryBackend {
                rows: Mutex::new(rows),
                ..Default::default()
            },
            false,
        )
        .with_previews(PreviewFetcher::new(Arc::new(StaticPreview)));

        s.load().await;
        assert_eq!(s.wait_for_previews().await, 1);
        let view = s.view();
        let view = view.lock().await;
        assert!(matches!(view.state(), ListState::Items(_)));
        assert!(view.to_html().contains("Example Domain"));
        assert!(view.to_html().contains(">Anonymous<"));
    }

    #[tokio::test]
    async fn reloads_drop_finished_preview_lookups() {
        let rows = vec![Comment {
            id: CommentId::new("a"),
            author_name: None,
            body: Some("see https://example.com".into()),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            background_color: None,
            font_family: None,
        }];
        let mut s = section(
            MemoryBackend {
                rows: Mutex::new(rows),
                ..Default::default()
            },
            false,
        )
        .with_previews(PreviewFetcher::new(Arc::new(StaticPreview)));

        for _ in 0..3 {
            s.load().await;
            while s.pending_previews.iter().any(|h| !h.is_finished()) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }
        s.load().await;
        assert_eq!(s.pending_previews.len(), 1);
        assert_eq!(s.wait_for_previews().await, 1);
        assert!(s.pending_previews.is_empty());
    }

    #[test]
    fn gate_drives_form_visibility() {
        let mut s = section(MemoryBackend::default(), false);
        let gate = crate::gate::CapabilityGate::new(false);
        s.apply_gate(&gate.view());
        assert!(!s.form().visible && !s.form().submit_enabled);

        s.apply_gate(&gate.apply(&domain::AuthEvent::SignedIn(session(Some("Ada")))));
        assert!(s.form().visible && s.form().submit_enabled);
    }
}
