use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::api::error_response;
use crate::infrastructure::AppState;

#[utoipa::path(
    get,
    path = "/api/loans",
    responses(
        (status = 200, description = "Borrowing history in borrow order")
    )
)]
pub async fn list_loans(State(state): State<AppState>) -> Json<Value> {
    let desk = state.desk.lock().await;
    let loans = desk.history();

    Json(json!({
        "loans": loans,
        "total": loans.len()
    }))
}

#[utoipa::path(
    post,
    path = "/api/loans/borrow/{id}",
    params(
        ("id" = String, Path, description = "Catalog book id, numeric or text")
    ),
    responses(
        (status = 201, description = "Book borrowed"),
        (status = 404, description = "Book not in catalog"),
        (status = 409, description = "Book already borrowed"),
        (status = 502, description = "Catalog service refused the loan")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let mut desk = state.desk.lock().await;
    let id = desk.lookup_id(&key);

    match desk.borrow(id).await {
        Ok(loan) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Book borrowed successfully",
                "loan": loan
            })),
        )
            .into_response(),
        Err(e) => {
            error_response(&e, "Could not borrow book. It might already be taken.").into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/loans/return/{index}",
    params(
        ("index" = usize, Path, description = "Position in the borrowing history")
    ),
    responses(
        (status = 200, description = "Book returned"),
        (status = 404, description = "No loan at that position"),
        (status = 502, description = "Catalog service refused the return")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    let mut desk = state.desk.lock().await;

    match desk.return_item(index).await {
        Ok(loan) => (
            StatusCode::OK,
            Json(json!({
                "message": "Book returned successfully",
                "loan": loan
            })),
        )
            .into_response(),
        Err(e) => error_response(&e, "Could not return book. Try again.").into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/loans/reminders",
    responses(
        (status = 200, description = "Loans due tomorrow or overdue")
    )
)]
pub async fn list_reminders(State(state): State<AppState>) -> Json<Value> {
    let desk = state.desk.lock().await;

    let reminders: Vec<Value> = desk
        .reminders(Utc::now())
        .into_iter()
        .map(|r| {
            json!({
                "kind": r.kind,
                "id": r.id,
                "title": r.title,
                "due_date": r.due_date,
                "days_left": r.days_left,
                "message": r.message()
            })
        })
        .collect();

    Json(json!({ "reminders": reminders }))
}
