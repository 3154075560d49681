use axum::{Json, extract::State, http::Uri};
use std::sync::Arc;

use crate::state::AppState;

// Stand-in for the application's API routes, reached only through the gate
pub async fn api_handler(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "path": uri.path(),
        "client_windows": state.rate_limiter.client_count(),
    }))
}
