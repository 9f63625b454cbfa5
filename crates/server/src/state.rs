use serde_json::{Map, Value};
use std::sync::Arc;

use crate::chat::Completion;

#[derive(Clone)]
pub struct AppState {
    // None without an API key, the chat route then answers 500
    pub chat: Option<Arc<dyn Completion>>,
    pub public_globals: Arc<Map<String, Value>>,
}
