//! Dashboard HTTP handlers and view rendering.

use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    Error,
    auth::{AuthContext, UserID, get_user_by_id},
    dashboard::cards::summary_cards_view,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    transaction::{
        TransactionForm, TransactionState, ValidationError, list_all_transactions, summarise,
        transaction_form_fields,
    },
};

/// Display the totals of the user's whole ledger and the add transaction form.
pub async fn get_dashboard_page(
    State(state): State<TransactionState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    render_dashboard(auth.user_id, &connection, &TransactionForm::default(), None)
        .map(IntoResponse::into_response)
}

/// Render the dashboard for `user_id`.
///
/// The add form is filled in with `values`, and `error` is shown under the
/// form. This lets the add endpoint show a rejected submission back to the
/// user.
///
/// # Errors
/// Returns an error if the user or their transactions could not be read.
pub(crate) fn render_dashboard(
    user_id: UserID,
    connection: &Connection,
    values: &TransactionForm,
    error: Option<&ValidationError>,
) -> Result<Markup, Error> {
    let user = get_user_by_id(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;
    let transactions = list_all_transactions(Some(user_id), connection)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;
    let summary = summarise(&transactions);

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let statement_link = link(endpoints::STATEMENT_VIEW, "extrato");

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg"
            {
                h2 class="text-2xl font-bold" { "Olá, " (user.username) }

                (summary_cards_view(&summary))

                p id="transaction-count" class="mb-6 text-gray-600 dark:text-gray-400"
                {
                    @match summary.count {
                        0 => { "Nenhuma transação registrada ainda." }
                        1 => { "1 transação registrada. " }
                        count => { (count) " transações registradas. " }
                    }

                    @if summary.count > 0 {
                        "Veja o " (statement_link) " para editar ou excluir."
                    }
                }

                section class="w-full max-w-md"
                {
                    h3 class="text-xl font-semibold mb-4" { "Nova transação" }

                    form
                        method="post"
                        action=(endpoints::ADD_TRANSACTION)
                        class="space-y-4"
                    {
                        (transaction_form_fields(values, false, error))

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Adicionar" }
                    }
                }
            }
        }
    );

    Ok(base("Dashboard", &content))
}
