use domain::{Comment, CommentBody, CommentStyle, NewComment, SectionId, Session};
use tracing::{info, warn};

use crate::{
    backend::CommentBackend,
    columns::ColumnStrategy,
    error::{LoadFailure, StoreError, SubmitError},
};

pub struct CommentsClient<B> {
    backend: B,
    strategy: ColumnStrategy,
    section: SectionId,
    require_verification: bool,
}

impl<B: CommentBackend> CommentsClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            strategy: ColumnStrategy::default(),
            section: SectionId::main(),
            require_verification: false,
        }
    }

    pub fn with_strategy(mut self, strategy: ColumnStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_section(mut self, section: SectionId) -> Self {
        self.section = section;
        self
    }

    pub fn require_verification(mut self, required: bool) -> Self {
        self.require_verification = required;
        self
    }

    pub fn verification_required(&self) -> bool {
        self.require_verification
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Newest first. A schema mismatch on the preferred column set is retried
    /// once with the reduced set, and that second answer is final.
    pub async fn load_comments(&self) -> Result<Vec<Comment>, LoadFailure> {
        let mut comments = match self.backend.select(&self.strategy.preferred).await {
            Ok(rows) => rows,
            Err(e) if self.strategy.should_fall_back(&e) => {
                warn!("Optional comment columns unavailable ({}), retrying without them", e);
                self.backend
                    .select(&self.strategy.reduced)
                    .await
                    .map_err(|source| LoadFailure {
                        source,
                        used_fallback: true,
                    })?
            }
            Err(source) => {
                return Err(LoadFailure {
                    source,
                    used_fallback: false,
                })
            }
        };

        // Stable: equal timestamps keep the store's order.
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    /// Checks run in order and short-circuit: body, session, verification
    /// token. Only then is a row inserted.
    pub async fn submit_comment(
        &self,
        draft: &str,
        style: CommentStyle,
        session: Option<&Session>,
        verification_token: Option<&str>,
    ) -> Result<Option<Comment>, SubmitError> {
        let body = CommentBody::parse(draft).map_err(|_| SubmitError::EmptyBody)?;

        let session = session.ok_or(SubmitError::NoSession)?;
        if session.user.id.trim().is_empty() {
            return Err(SubmitError::NoSession);
        }

        if self.require_verification
            && verification_token.map_or(true, |t| t.trim().is_empty())
        {
            return Err(SubmitError::VerificationMissing);
        }

        let row = NewComment::new(&session.user, body, style, self.section.clone());

        let mut rows = self
            .backend
            .insert(&row, &session.access_token)
            .await
            .map_err(|e: StoreError| {
                warn!("Comment insert failed: {}", e);
                SubmitError::Store(e)
            })?;
        info!("Comment stored for user {}", session.user.id);
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }
}
