//! Card components for displaying the totals of a [Summary].
//!
//! Used on the dashboard for the whole ledger and on the statement page for
//! the selected period.

use maud::{Markup, html};

use crate::{
    html::format_currency,
    transaction::{Summary, TransactionKind},
};

fn card(id: &str, title: &str, amount: f64, amount_style: &str) -> Markup {
    html! {
        div
            id=(id)
            class="p-4 bg-white rounded-lg shadow dark:bg-gray-800"
        {
            h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class={ "mt-1 text-2xl font-semibold " (amount_style) } { (format_currency(amount)) }
        }
    }
}

fn kind_style(kind: &TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "text-green-600 dark:text-green-400",
        TransactionKind::Expense => "text-red-600 dark:text-red-400",
        _ => "text-yellow-600 dark:text-yellow-400",
    }
}

fn balance_style(net_balance: f64) -> &'static str {
    if net_balance < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    }
}

/// Renders one card per recognised kind plus the net balance.
///
/// Each card has a stable ID (`total-entrada`, `total-saida`, `total-fiado`
/// and `saldo`) so the amounts can be found in the page.
pub(crate) fn summary_cards_view(summary: &Summary) -> Markup {
    html! {
        section class="w-full grid grid-cols-2 md:grid-cols-4 gap-4 my-6"
        {
            @for kind in TransactionKind::RECOGNISED {
                (card(
                    &format!("total-{}", kind.as_str()),
                    kind.label(),
                    summary.total(&kind),
                    kind_style(&kind),
                ))
            }

            (card("saldo", "Saldo", summary.net_balance, balance_style(summary.net_balance)))
        }
    }
}
