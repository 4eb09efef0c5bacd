//! Database query helpers for listing transactions.

use rusqlite::Connection;

use crate::{Error, auth::UserID};

use super::{
    core::{Transaction, TransactionKind, map_transaction_row},
    period::DateRange,
};

/// Which transactions a listing should return.
///
/// Every condition that is set must hold, unset conditions match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions dated within this inclusive range.
    pub range: Option<DateRange>,
    /// Only include transactions of this kind.
    pub kind: Option<TransactionKind>,
}

/// Get the transactions in `scope` that match `filter`, newest first.
///
/// Transactions on the same date are ordered by decreasing ID, so the most
/// recently added one comes first.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn list_transactions(
    filter: &TransactionFilter,
    scope: Option<UserID>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, date, kind, description, amount, user_id FROM \"transaction\"
             WHERE (:owner IS NULL OR user_id = :owner)
             AND (:start IS NULL OR date >= :start)
             AND (:end IS NULL OR date <= :end)
             AND (:kind IS NULL OR kind = :kind)
             ORDER BY date DESC, id DESC",
        )?
        .query_map(
            rusqlite::named_params! {
                ":owner": scope.map(|owner| owner.as_i64()),
                ":start": filter.range.map(|range| range.start),
                ":end": filter.range.map(|range| range.end),
                ":kind": filter.kind.as_ref().map(TransactionKind::as_str),
            },
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Get every transaction in `scope`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn list_all_transactions(
    scope: Option<UserID>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    list_transactions(&TransactionFilter::default(), scope, connection)
}
