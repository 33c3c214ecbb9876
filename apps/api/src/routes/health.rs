use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version and whether the model service answers.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let reachable = state.llm.is_available().await;

    Json(json!({
        "status": "healthy",
        "service": "Job Description Generator API",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.llm.model(),
        "model_status": if reachable { "reachable" } else { "unreachable" }
    }))
}
