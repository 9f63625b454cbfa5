use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("comment body is empty")]
    EmptyBody,
    #[error("invalid section id: {0:?}")]
    InvalidSection(String),
    #[error("not a hex color: {0:?}")]
    InvalidColor(String),
    #[error("font is not in the allow-list: {0:?}")]
    UnknownFont(String),
}
