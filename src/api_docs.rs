use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::books::list_books,
        api::books::refresh_books,
        api::books::search_books,
        api::discovery::list_suggestions,
        api::loan::list_loans,
        api::loan::borrow_book,
        api::loan::return_book,
        api::loan::list_reminders,
    ),
    tags(
        (name = "bibliodesk", description = "BiblioDesk local API")
    )
)]
pub struct ApiDoc;
