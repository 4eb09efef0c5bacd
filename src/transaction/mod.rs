//! Transaction management for the cash-flow ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the database functions for storing and querying transactions
//! - The statement periods and how totals are summarised
//! - View handlers for adding, editing, deleting and listing transactions

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod period;
mod query;
mod statement_page;
mod summary;

pub use core::{
    NewTransaction, Transaction, TransactionKind, count_transactions, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, map_transaction_row,
    update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use form::{TransactionForm, ValidationError, parse_date, transaction_form_fields};
pub use period::{DateRange, NeedsRedirect, Period, resolve};
pub use query::{TransactionFilter, list_all_transactions, list_transactions};
pub use statement_page::get_statement_page;
pub use summary::{Summary, summarise};

/// The state needed by the transaction pages and endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
