use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::style::{CommentStyle, FontFamily, HexColor};

pub const DEFAULT_SECTION: &str = "main";
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";
pub const SIGNED_IN_FALLBACK: &str = "Signed in";
pub const MAX_BODY_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(s: impl Into<String>) -> Result<Self, DomainError> {
        let s = s.into();
        if s.is_empty() || s.len() > 64 {
            return Err(DomainError::InvalidSection(s));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidSection(s));
        }
        Ok(Self(s))
    }

    pub fn main() -> Self {
        Self(DEFAULT_SECTION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SectionId {
    fn default() -> Self {
        Self::main()
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier. The table may use a uuid or a bigint key, so
/// both JSON strings and numbers are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CommentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => CommentId(s),
            Raw::Int(n) => CommentId(n.to_string()),
        })
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
}

impl Comment {
    pub fn author_display(&self) -> &str {
        match self.author_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => ANONYMOUS_AUTHOR,
        }
    }

    pub fn style(&self) -> CommentStyle {
        CommentStyle::from_raw(
            self.background_color.as_deref(),
            self.font_family.as_deref(),
        )
    }
}

/// Validated comment text: trimmed, truncated to [`MAX_BODY_CHARS`], never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody(String);

impl CommentBody {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let body: String = if trimmed.chars().count() > MAX_BODY_CHARS {
            trimmed.chars().take(MAX_BODY_CHARS).collect()
        } else {
            trimmed.to_string()
        };
        if body.is_empty() {
            return Err(DomainError::EmptyBody);
        }
        Ok(Self(body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub user_id: String,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub body: String,
    pub section_id: SectionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<HexColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
}

impl NewComment {
    pub fn new(identity: &Identity, body: CommentBody, style: CommentStyle, section: SectionId) -> Self {
        Self {
            user_id: identity.id.clone(),
            author_name: identity.author_name().to_string(),
            author_avatar_url: identity.metadata.avatar_url.clone(),
            body: body.into_inner(),
            section_id: section,
            background_color: style.background_color,
            font_family: style.font_family,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "user_metadata")]
    pub metadata: UserMetadata,
}

impl Identity {
    fn resolved_name(&self) -> Option<&str> {
        [
            self.metadata.full_name.as_deref(),
            self.metadata.name.as_deref(),
            self.email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.resolved_name().unwrap_or(SIGNED_IN_FALLBACK)
    }

    pub fn author_name(&self) -> &str {
        self.resolved_name().unwrap_or(ANONYMOUS_AUTHOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: Identity,
}
