use axum::{
    extract::{Extension, Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    Error,
    auth::AuthContext,
    database_id::TransactionId,
    endpoints,
    transaction::{TransactionState, delete_transaction},
};

/// A route handler for deleting a transaction, redirects to the statement on success.
///
/// Responds with the 404 page if the transaction does not exist or belongs
/// to another user.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_transaction(transaction_id, Some(auth.user_id), &connection) {
        Ok(()) => {
            tracing::debug!("deleted transaction {transaction_id}");
            Redirect::to(endpoints::STATEMENT_VIEW).into_response()
        }
        Err(Error::NotFound) => Error::NotFound.into_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Extension, Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::{AuthContext, UserID},
        endpoints,
        test_utils::{
            assert_redirect, create_other_user, get_test_connection, get_transaction_state,
        },
        transaction::{
            NewTransaction, TransactionKind, count_transactions, create_transaction,
            get_transaction,
        },
    };

    use super::delete_transaction_endpoint;

    fn add(connection: &Connection, owner: UserID) -> i64 {
        create_transaction(
            NewTransaction {
                date: date!(2024 - 03 - 01),
                kind: TransactionKind::Expense,
                description: "aluguel".to_owned(),
                amount: 400.0,
            },
            owner,
            connection,
        )
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn can_delete_transaction() {
        let (connection, user_id) = get_test_connection();
        let id = add(&connection, user_id);
        let state = get_transaction_state(connection);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(AuthContext { user_id }),
            Path(id),
        )
        .await;

        assert_redirect(&response, endpoints::STATEMENT_VIEW);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(id, None, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (connection, user_id) = get_test_connection();
        add(&connection, user_id);
        let state = get_transaction_state(connection);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(AuthContext { user_id }),
            Path(42),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(None, &connection).unwrap(), 1);
    }

    #[tokio::test]
    async fn cannot_delete_other_users_transaction() {
        let (connection, user_id) = get_test_connection();
        let other_user = create_other_user(&connection);
        let id = add(&connection, user_id);
        let state = get_transaction_state(connection);

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(AuthContext {
                user_id: other_user,
            }),
            Path(id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_transaction(id, None, &connection).is_ok());
    }
}
