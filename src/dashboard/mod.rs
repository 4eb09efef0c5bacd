//! The dashboard shows the totals of the whole ledger and the form for
//! adding transactions.

mod cards;
mod handlers;

pub(crate) use cards::summary_cards_view;
pub use handlers::get_dashboard_page;
pub(crate) use handlers::render_dashboard;
