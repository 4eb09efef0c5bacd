//! Per-kind totals and the net balance of a list of transactions.

use crate::transaction::{Transaction, TransactionKind};

/// The totals of a list of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// The sum of all income (entrada).
    pub income: f64,
    /// The sum of all expenses (saida).
    pub expense: f64,
    /// The sum of all purchases on credit (fiado).
    pub credit: f64,
    /// Income minus expenses. Credit does not affect the balance.
    pub net_balance: f64,
    /// The number of transactions summarised, including those of unknown kinds.
    pub count: usize,
}

impl Summary {
    /// The total for `kind`, zero for kinds that are not summed.
    pub fn total(&self, kind: &TransactionKind) -> f64 {
        match kind {
            TransactionKind::Income => self.income,
            TransactionKind::Expense => self.expense,
            TransactionKind::Credit => self.credit,
            TransactionKind::Other(_) => 0.0,
        }
    }
}

/// Add up `transactions` by kind.
///
/// Transactions of an unknown kind are counted but excluded from every total.
pub fn summarise<'a, I>(transactions: I) -> Summary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut summary = transactions
        .into_iter()
        .fold(Summary::default(), |mut summary, transaction| {
            match transaction.kind {
                TransactionKind::Income => summary.income += transaction.amount,
                TransactionKind::Expense => summary.expense += transaction.amount,
                TransactionKind::Credit => summary.credit += transaction.amount,
                TransactionKind::Other(_) => {}
            }
            summary.count += 1;
            summary
        });

    summary.net_balance = summary.income - summary.expense;
    summary
}
