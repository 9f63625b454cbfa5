pub mod chat;
pub mod config;
pub mod http;
pub mod state;

pub use crate::config::Settings;
pub use crate::http::router::build_router;
pub use crate::state::AppState;
