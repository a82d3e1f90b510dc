use std::sync::Arc;

use axum::{Extension, Json};
use chess_core::RulesEngine;
use serde_json::{json, Value as JsonValue};

use crate::live_cache::LiveCache;

/// GET /health
pub async fn health_check<R: RulesEngine>(
    Extension(cache): Extension<Arc<LiveCache<R>>>,
) -> Json<JsonValue> {
    Json(json!({
        "status": "ok",
        "watcher_initialized": cache.is_watching(),
        "boards": cache.boards().len(),
    }))
}
