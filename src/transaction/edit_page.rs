use axum::{
    extract::{Extension, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    auth::AuthContext,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    transaction::{
        TransactionForm, TransactionState, ValidationError, get_transaction,
        transaction_form_fields,
    },
};

/// Renders the page for editing a transaction owned by the logged in user.
///
/// Responds with the 404 page if the transaction does not exist or belongs
/// to another user.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionState>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, Some(auth.user_id), &connection)
        .inspect_err(|error| {
            if *error != Error::NotFound {
                tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
            }
        })?;

    let values = TransactionForm::from(&transaction);

    Ok(edit_transaction_view(transaction_id, &values, None).into_response())
}

/// The edit page for the transaction `transaction_id`.
///
/// Unlike the add form, every field is required.
pub(crate) fn edit_transaction_view(
    transaction_id: TransactionId,
    values: &TransactionForm,
    error: Option<&ValidationError>,
) -> Markup {
    // The statement is the page that links to the edit page.
    let nav_bar = NavBar::new(endpoints::STATEMENT_VIEW).into_html();
    let edit_endpoint = format_endpoint(endpoints::EDIT_TRANSACTION, transaction_id);
    let delete_endpoint = format_endpoint(endpoints::DELETE_TRANSACTION, transaction_id);

    let content = html!(
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Editar transação" }

            form
                id="edit-transaction"
                method="post"
                action=(edit_endpoint)
                class="w-full space-y-4"
            {
                (transaction_form_fields(values, true, error))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Salvar" }
            }

            form
                id="delete-transaction"
                method="post"
                action=(delete_endpoint)
                class="w-full mt-6 flex justify-between items-center"
            {
                (link(endpoints::STATEMENT_VIEW, "Voltar ao extrato"))

                button type="submit" class=(BUTTON_DELETE_STYLE) { "Excluir" }
            }
        }
    );

    base("Editar transação", &content)
}
