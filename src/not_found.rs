//! The page shown for unknown routes and missing transactions.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// Route handler for the router fallback.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// A 404 response with the "not found" page.
pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Página não encontrada.",
            "The page or transaction you were looking for does not exist. \
            It may have been deleted or the address may be mistyped.",
        ),
    )
        .into_response()
}
