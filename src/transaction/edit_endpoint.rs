use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;

use crate::{
    Error,
    auth::AuthContext,
    database_id::TransactionId,
    endpoints,
    transaction::{
        TransactionForm, TransactionState, edit_page::edit_transaction_view, get_transaction,
        update_transaction,
    },
};

/// A route handler for replacing the fields of a transaction, redirects to
/// the statement on success.
///
/// Unknown transactions, including those owned by other users, get the 404
/// page. An invalid form is shown again with the error message.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    if let Err(error) = get_transaction(transaction_id, Some(auth.user_id), &connection) {
        if error != Error::NotFound {
            tracing::error!("Could not get transaction {transaction_id}: {error}");
        }

        return error.into_response();
    }

    let fields = match form.validate(None) {
        Ok(fields) => fields,
        Err(validation_error) => {
            tracing::debug!("rejected edit of transaction {transaction_id}: {validation_error}");

            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                edit_transaction_view(transaction_id, &form, Some(&validation_error)),
            )
                .into_response();
        }
    };

    match update_transaction(transaction_id, fields, Some(auth.user_id), &connection) {
        Ok(()) => Redirect::to(endpoints::STATEMENT_VIEW).into_response(),
        // The transaction was deleted after it was checked above.
        Err(Error::NotFound) => Error::NotFound.into_response(),
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}
