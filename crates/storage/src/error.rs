use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Transport(String),
    #[error("store rejected request (HTTP {status}, code {code:?}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("unexpected store response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
#[error("could not load comments: {source}")]
pub struct LoadFailure {
    #[source]
    pub source: StoreError,
    pub used_fallback: bool,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("comment body is empty")]
    EmptyBody,
    #[error("no signed-in session")]
    NoSession,
    #[error("bot verification token missing")]
    VerificationMissing,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SubmitError {
    pub fn reached_store(&self) -> bool {
        matches!(self, SubmitError::Store(_))
    }
}
