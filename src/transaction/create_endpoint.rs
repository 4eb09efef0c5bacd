//! Defines the endpoint for adding a transaction from the dashboard form.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;

use crate::{
    Error,
    auth::AuthContext,
    dashboard::render_dashboard,
    endpoints,
    timezone::local_today,
    transaction::{TransactionForm, TransactionState, core::create_transaction},
};

/// A route handler for creating a new transaction, redirects to the dashboard on success.
///
/// A blank date means today in the server's local timezone. If the form is
/// invalid, the dashboard is shown again with the submitted values and the
/// error message.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(auth): Extension<AuthContext>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let new_transaction = match form.validate(Some(today)) {
        Ok(new_transaction) => new_transaction,
        Err(validation_error) => {
            tracing::debug!("rejected new transaction: {validation_error}");

            return match render_dashboard(
                auth.user_id,
                &connection,
                &form,
                Some(&validation_error),
            ) {
                Ok(page) => (StatusCode::UNPROCESSABLE_ENTITY, page).into_response(),
                Err(error) => error.into_response(),
            };
        }
    };

    match create_transaction(new_transaction, auth.user_id, &connection) {
        Ok(transaction) => {
            tracing::debug!("created transaction {}", transaction.id);
            Redirect::to(endpoints::DASHBOARD_VIEW).into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_response()
        }
    }
}
