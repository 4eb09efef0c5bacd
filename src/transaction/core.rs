//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::ValidationError,
};

// ============================================================================
// MODELS
// ============================================================================

/// What a transaction does to the cash balance.
///
/// The three recognised kinds are stored with their Portuguese names
/// (`entrada`, `saida` and `fiado`). Any other non-empty kind is kept
/// verbatim in [TransactionKind::Other]; such transactions are listed but
/// never counted in any total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
    /// A purchase on credit (fiado), recorded but not part of the balance.
    Credit,
    /// A kind this application does not know about.
    Other(String),
}

impl TransactionKind {
    /// The kinds that are summed in balances and statements, in display order.
    pub const RECOGNISED: [TransactionKind; 3] = [
        TransactionKind::Income,
        TransactionKind::Expense,
        TransactionKind::Credit,
    ];

    /// The name used in the database, forms and query strings.
    pub fn as_str(&self) -> &str {
        match self {
            TransactionKind::Income => "entrada",
            TransactionKind::Expense => "saida",
            TransactionKind::Credit => "fiado",
            TransactionKind::Other(kind) => kind,
        }
    }

    /// The name shown to users.
    pub fn label(&self) -> &str {
        match self {
            TransactionKind::Income => "Entrada",
            TransactionKind::Expense => "Saída",
            TransactionKind::Credit => "Fiado",
            TransactionKind::Other(kind) => kind,
        }
    }

    /// Whether the kind contributes to totals.
    pub fn is_recognised(&self) -> bool {
        !matches!(self, TransactionKind::Other(_))
    }

    fn from_stored(raw_kind: String) -> Self {
        raw_kind
            .parse()
            .unwrap_or(TransactionKind::Other(raw_kind))
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    /// Parse a kind from user input.
    ///
    /// Leading and trailing whitespace is ignored and the English names
    /// `income`, `expense` and `credit` are accepted as aliases.
    fn from_str(raw_kind: &str) -> Result<Self, Self::Err> {
        let kind = raw_kind.trim();

        match kind.to_lowercase().as_str() {
            "" => Err(ValidationError::MissingField("tipo")),
            "entrada" | "income" => Ok(TransactionKind::Income),
            "saida" | "saída" | "expense" => Ok(TransactionKind::Expense),
            "fiado" | "credit" => Ok(TransactionKind::Credit),
            _ => Ok(TransactionKind::Other(kind.to_owned())),
        }
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransactionKind> for String {
    fn from(value: TransactionKind) -> Self {
        value.as_str().to_owned()
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a user's cash-flow ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The date the transaction is attributed to.
    pub date: Date,
    /// Whether the transaction is income, an expense, on credit or something else.
    pub kind: TransactionKind,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money involved. Never negative, the sign is implied by `kind`.
    pub amount: f64,
    /// The user that owns this transaction.
    pub user_id: UserID,
}

/// The user editable fields of a [Transaction], already validated.
///
/// Used both for creating transactions and for replacing the fields of an
/// existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: Date,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                kind TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Statement queries filter by owner and date range.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction owned by `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `owner` is not a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    owner: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (date, kind, description, amount, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, date, kind, description, amount, user_id",
        )?
        .query_row(
            params![
                new_transaction.date,
                new_transaction.kind.as_str(),
                new_transaction.description,
                new_transaction.amount,
                owner.as_i64(),
            ],
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// With `Some(owner)` as the `scope`, transactions belonging to other users
/// are treated as missing.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction in scope,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    scope: Option<UserID>,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, date, kind, description, amount, user_id FROM \"transaction\"
             WHERE id = :id AND (:owner IS NULL OR user_id = :owner)",
        )?
        .query_one(
            rusqlite::named_params! {
                ":id": id,
                ":owner": scope.map(|owner| owner.as_i64()),
            },
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Replace the date, kind, description and amount of the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction in scope,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    fields: NewTransaction,
    scope: Option<UserID>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET date = :date, kind = :kind, description = :description, amount = :amount
         WHERE id = :id AND (:owner IS NULL OR user_id = :owner)",
        rusqlite::named_params! {
            ":date": fields.date,
            ":kind": fields.kind.as_str(),
            ":description": fields.description,
            ":amount": fields.amount,
            ":id": id,
            ":owner": scope.map(|owner| owner.as_i64()),
        },
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction in scope,
///   in which case nothing is deleted,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    scope: Option<UserID>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND (:owner IS NULL OR user_id = :owner)",
        rusqlite::named_params! {
            ":id": id,
            ":owner": scope.map(|owner| owner.as_i64()),
        },
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the number of transactions in scope.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(scope: Option<UserID>, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE (?1 IS NULL OR user_id = ?1);",
            [scope.map(|owner| owner.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
///
/// Expects the columns `id, date, kind, description, amount, user_id` in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let raw_kind: String = row.get(2)?;
    let description = row.get(3)?;
    let amount = row.get(4)?;
    let raw_user_id = row.get(5)?;

    Ok(Transaction {
        id,
        date,
        kind: TransactionKind::from_stored(raw_kind),
        description,
        amount,
        user_id: UserID::new(raw_user_id),
    })
}

// ============================================================================
// TESTS
// ============================================================================
