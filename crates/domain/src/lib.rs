mod clock;
mod error;
mod events;
mod models;
pub mod protocol;
mod style;
pub mod text;

pub use clock::DisplayClock;
pub use error::DomainError;
pub use events::AuthEvent;
pub use models::{
    Comment, CommentBody, CommentId, Identity, NewComment, SectionId, Session, UserMetadata,
    ANONYMOUS_AUTHOR, DEFAULT_SECTION, MAX_BODY_CHARS, SIGNED_IN_FALLBACK,
};
pub use style::{CommentStyle, FontFamily, HexColor};
