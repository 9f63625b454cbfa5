use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service answered HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("not signed in")]
    NotSignedIn,
}
