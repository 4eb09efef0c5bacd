//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/{transaction_id}/edit', use [format_endpoint].

/// The dashboard with the whole-ledger totals and the form for adding transactions.
pub const DASHBOARD_VIEW: &str = "/";
/// The statement page listing the transactions in a period.
pub const STATEMENT_VIEW: &str = "/extrato";
/// The route for creating a transaction.
pub const ADD_TRANSACTION: &str = "/add";
/// The page for editing a transaction, also the route the edit form is posted to.
pub const EDIT_TRANSACTION: &str = "/{transaction_id}/edit";
/// The route for deleting a transaction.
pub const DELETE_TRANSACTION: &str = "/{transaction_id}/delete";
/// The route for getting the log in page and logging in.
pub const LOG_IN: &str = "/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";
/// The route for setting up the first user.
pub const REGISTER: &str = "/register";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/{transaction_id}/edit', '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
