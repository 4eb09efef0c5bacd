use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    PasswordHash, Username,
    auth::{UserID, create_user},
    db::initialize,
    transaction::TransactionState,
};

/// An initialised in-memory database with one registered user.
pub(crate) fn get_test_connection() -> (Connection, UserID) {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialise database");
    let user = create_user(
        Username::new_unchecked("maria"),
        PasswordHash::new_unchecked("hunter2"),
        &connection,
    )
    .expect("Could not create test user");

    (connection, user.id)
}

/// Register another user, e.g. for checking that users cannot see each other's data.
pub(crate) fn create_other_user(connection: &Connection) -> UserID {
    create_user(
        Username::new_unchecked("joao"),
        PasswordHash::new_unchecked("hunter3"),
        connection,
    )
    .expect("Could not create test user")
    .id
}

/// The transaction handler state for `connection` in UTC.
pub(crate) fn get_transaction_state(connection: Connection) -> TransactionState {
    TransactionState {
        db_connection: Arc::new(Mutex::new(connection)),
        local_timezone: "Etc/UTC".to_owned(),
    }
}
