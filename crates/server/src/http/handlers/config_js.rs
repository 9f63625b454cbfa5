use axum::{extract::State, http::header, response::IntoResponse};
use serde_json::{Map, Value};

use crate::state::AppState;

pub async fn config_js(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        render(&state.public_globals),
    )
}

pub fn render(globals: &Map<String, Value>) -> String {
    let mut out = String::from("// Generated from environment variables\n");
    for (name, value) in globals {
        out.push_str(&format!("window.{} = {};\n", name, value));
    }
    out
}
