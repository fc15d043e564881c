pub mod books;
pub mod discovery;
pub mod health;
pub mod loan;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::domain::BorrowError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalog
        .route("/books", get(books::list_books))
        .route("/books/refresh", post(books::refresh_books))
        .route("/books/search", get(books::search_books))
        .route("/discover", get(discovery::list_suggestions))
        // Loans
        .route("/loans", get(loan::list_loans))
        .route("/loans/borrow/:id", post(loan::borrow_book))
        .route("/loans/return/:index", post(loan::return_book))
        .route("/loans/reminders", get(loan::list_reminders))
        .with_state(state)
}

/// Map a desk failure to a status and a JSON body.
/// `remote_message` is what the user sees when the catalog service failed.
pub(crate) fn error_response(err: &BorrowError, remote_message: &str) -> (StatusCode, Json<Value>) {
    let status = match err {
        BorrowError::AlreadyBorrowed(_) => StatusCode::CONFLICT,
        BorrowError::IndexOutOfRange { .. } | BorrowError::NotInCatalog(_) => {
            StatusCode::NOT_FOUND
        }
        BorrowError::RemoteFailure(_) => StatusCode::BAD_GATEWAY,
        BorrowError::PersistenceCorrupt(_) | BorrowError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let message = match err {
        BorrowError::RemoteFailure(_) => remote_message.to_string(),
        other => other.to_string(),
    };

    (
        status,
        Json(json!({
            "error": message,
            "detail": err.to_string()
        })),
    )
}
