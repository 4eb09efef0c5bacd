//! Database initialization for the application's SQLite database.

use rusqlite::Connection;

use crate::{auth::create_user_table, transaction::create_transaction_table};

/// Create the all of the database tables for the application.
///
/// Tables are only created if they do not already exist, so this is safe to
/// call every time the server starts.
///
/// # Errors
/// This function may return a [rusqlite::Error] if something went wrong creating the tables.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    create_user_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}
