//! Discover API Endpoint
//!
//! Static reading suggestions shown next to the catalog.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::infrastructure::AppState;

/// GET /api/discover
#[utoipa::path(
    get,
    path = "/api/discover",
    responses(
        (status = 200, description = "Reading suggestions")
    )
)]
pub async fn list_suggestions(State(state): State<AppState>) -> Json<Value> {
    let desk = state.desk.lock().await;
    Json(json!({ "suggestions": desk.discover() }))
}
