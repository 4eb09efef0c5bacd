//! Database ID type definition.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// Alias for the IDs of rows in the transaction table.
pub type TransactionId = DatabaseId;
