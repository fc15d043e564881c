use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::infrastructure::AppState;

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "Cached catalog")
    )
)]
pub async fn list_books(State(state): State<AppState>) -> Json<Value> {
    let desk = state.desk.lock().await;
    let books = desk.catalog();

    Json(json!({
        "books": books,
        "total": books.len()
    }))
}

#[utoipa::path(
    post,
    path = "/api/books/refresh",
    responses(
        (status = 200, description = "Catalog reloaded from the catalog service"),
        (status = 502, description = "Catalog service unavailable")
    )
)]
pub async fn refresh_books(State(state): State<AppState>) -> impl IntoResponse {
    let mut desk = state.desk.lock().await;

    match desk.refresh_catalog().await {
        Ok(total) => (
            StatusCode::OK,
            Json(json!({
                "message": "Catalog refreshed",
                "total": total
            })),
        )
            .into_response(),
        Err(e) => error_response(&e, "Could not load the catalog. Try again later.").into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/books/search",
    params(
        ("q" = Option<String>, Query, description = "Matched against title, author and subject, ignoring case")
    ),
    responses(
        (status = 200, description = "Matching catalog entries")
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Value> {
    let desk = state.desk.lock().await;
    let books = desk.search(params.q.as_deref().unwrap_or_default());

    Json(json!({
        "books": books,
        "total": books.len()
    }))
}
