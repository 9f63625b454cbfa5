mod common;
mod drivers;
mod error;
mod traits;

pub use drivers::functions::{ChatClient, CHAT_EMPTY_TEXT, CHAT_FAILURE_TEXT};
pub use drivers::gotrue::GoTrueAuth;
pub use drivers::microlink::{parse_metadata, MicrolinkClient, DEFAULT_ENDPOINT as MICROLINK_ENDPOINT};
pub use drivers::turnstile::ProvidedTokenWidget;
pub use error::AdapterError;
pub use traits::{
    IdentityProvider, LinkMetadata, LinkMetadataService, VerificationWidget, WidgetId,
    WidgetOptions, WidgetSignal,
};
