//! The statement (extrato): the transactions of a period, newest first, with
//! the totals of the listed transactions.

use axum::{
    extract::{Extension, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    auth::AuthContext,
    dashboard::summary_cards_view,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        DateRange, Period, Transaction, TransactionFilter, TransactionKind, TransactionState,
        list_transactions, parse_date, resolve, summarise,
    },
};

/// The query string of the statement page.
///
/// Every field is optional, the page falls back to the current month with no
/// kind filter.
#[derive(Debug, Default, Deserialize)]
pub struct StatementQuery {
    /// The period keyword, e.g. "ultimos_7_dias".
    pub periodo: Option<String>,
    /// The first date of a custom period as YYYY-MM-DD.
    pub start_date: Option<String>,
    /// The last date of a custom period as YYYY-MM-DD.
    pub end_date: Option<String>,
    /// Only list transactions of this kind. Blank or "todos" lists every kind.
    pub tipo_filtro: Option<String>,
}

/// The statement options after parsing the query string.
struct StatementOptions {
    period: Period,
    range: DateRange,
    kind: Option<TransactionKind>,
}

fn non_blank(raw_value: Option<&str>) -> Option<&str> {
    raw_value
        .map(str::trim)
        .filter(|raw_value| !raw_value.is_empty())
}

/// Parse the bounds of a custom period.
///
/// Both bounds are only parsed once both are present, a missing bound leaves
/// the pair empty so that the period resolves to a redirect.
fn parse_custom_bounds(
    raw_start: Option<&str>,
    raw_end: Option<&str>,
) -> Result<(Option<Date>, Option<Date>), Error> {
    match (non_blank(raw_start), non_blank(raw_end)) {
        (Some(raw_start), Some(raw_end)) => Ok((
            Some(parse_date(raw_start)?),
            Some(parse_date(raw_end)?),
        )),
        _ => Ok((None, None)),
    }
}

fn parse_kind_filter(raw_kind: Option<&str>) -> Option<TransactionKind> {
    match raw_kind.map(str::trim) {
        None | Some("" | "todos" | "all") => None,
        Some(raw_kind) => raw_kind.parse().ok(),
    }
}

/// The redirect used when a custom period is missing a bound.
fn current_month_url() -> String {
    format!(
        "{}?periodo={}",
        endpoints::STATEMENT_VIEW,
        Period::CurrentMonth.as_query_value()
    )
}

/// Display the logged in user's transactions for the selected period.
///
/// A custom period without both dates redirects to the current month, even
/// when the date that is present is malformed. Malformed custom dates are
/// otherwise answered with the 400 page.
pub async fn get_statement_page(
    State(state): State<TransactionState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<StatementQuery>,
) -> Result<Response, Error> {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezoneError(state.local_timezone));
    };

    let period = Period::from_query_value(query.periodo.as_deref());
    let (explicit_start, explicit_end) = if period == Period::Custom {
        parse_custom_bounds(query.start_date.as_deref(), query.end_date.as_deref())?
    } else {
        (None, None)
    };

    let Ok(range) = resolve(period, explicit_start, explicit_end, today) else {
        return Ok(Redirect::to(&current_month_url()).into_response());
    };

    let options = StatementOptions {
        period,
        range,
        kind: parse_kind_filter(query.tipo_filtro.as_deref()),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let filter = TransactionFilter {
        range: Some(options.range),
        kind: options.kind.clone(),
    };
    let transactions = list_transactions(&filter, Some(auth.user_id), &connection)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;

    Ok(statement_view(&options, &transactions).into_response())
}

fn statement_view(options: &StatementOptions, transactions: &[Transaction]) -> Markup {
    let nav_bar = NavBar::new(endpoints::STATEMENT_VIEW).into_html();
    let summary = summarise(transactions);

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-screen-lg space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Extrato" }

                    p id="statement-range" class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        (options.period.label()) ": " (options.range)
                    }
                }

                (filter_form_view(options))

                (summary_cards_view(&summary))

                (transaction_table_view(transactions))
            }
        }
    };

    base("Extrato", &content)
}

fn filter_form_view(options: &StatementOptions) -> Markup {
    let custom_dates = (options.period == Period::Custom).then_some(options.range);

    html! {
        form
            method="get"
            action=(endpoints::STATEMENT_VIEW)
            class="grid grid-cols-1 md:grid-cols-5 gap-4 items-end
                p-4 rounded bg-gray-50 dark:bg-gray-800"
        {
            div
            {
                label for="periodo" class=(FORM_LABEL_STYLE) { "Período" }

                select name="periodo" id="periodo" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for period in Period::ALL {
                        option
                            value=(period.as_query_value())
                            selected[period == options.period]
                        {
                            (period.label())
                        }
                    }
                }
            }

            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "De" }

                input
                    type="date"
                    name="start_date"
                    id="start_date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=[custom_dates.map(|range| range.start.to_string())];
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "Até" }

                input
                    type="date"
                    name="end_date"
                    id="end_date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=[custom_dates.map(|range| range.end.to_string())];
            }

            div
            {
                label for="tipo_filtro" class=(FORM_LABEL_STYLE) { "Tipo" }

                select name="tipo_filtro" id="tipo_filtro" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="todos" selected[options.kind.is_none()] { "Todos" }

                    @for kind in TransactionKind::RECOGNISED {
                        option
                            value=(kind.as_str())
                            selected[options.kind.as_ref() == Some(&kind)]
                        {
                            (kind.label())
                        }
                    }

                    @if let Some(kind) = options.kind.as_ref().filter(|kind| !kind.is_recognised()) {
                        option value=(kind.as_str()) selected { (kind.label()) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filtrar" }
        }
    }
}

fn amount_class(kind: &TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "text-green-700 dark:text-green-300",
        TransactionKind::Expense => "text-red-700 dark:text-red-300",
        TransactionKind::Credit => "text-yellow-700 dark:text-yellow-300",
        TransactionKind::Other(_) => "text-gray-500 dark:text-gray-400",
    }
}

fn transaction_table_view(transactions: &[Transaction]) -> Markup {
    html! {
        table
            id="statement"
            class="w-full my-2 text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Data" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Tipo" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Descrição" }
                    th scope="col" class="px-6 py-3 text-right" { "Valor" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Ações" }
                }
            }

            tbody
            {
                @for transaction in transactions {
                    tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                    {
                        td class=(TABLE_CELL_STYLE)
                        {
                            time datetime=(transaction.date) { (transaction.date) }
                        }
                        td class=(TABLE_CELL_STYLE) { (transaction.kind.label()) }
                        td class=(TABLE_CELL_STYLE) { (transaction.description) }
                        td class={ "px-6 py-4 text-right " (amount_class(&transaction.kind)) }
                        {
                            (format_currency(transaction.amount))
                        }
                        td class=(TABLE_CELL_STYLE)
                        {
                            a
                                href=(format_endpoint(endpoints::EDIT_TRANSACTION, transaction.id))
                                class=(LINK_STYLE)
                            {
                                "Editar"
                            }
                        }
                    }
                }

                @if transactions.is_empty() {
                    tr
                    {
                        td
                            colspan="5"
                            data-empty-state="true"
                            class="px-6 py-4 text-center"
                        {
                            "Nenhuma transação neste período."
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Extension, Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Date, Duration, macros::date};

    use crate::{
        Error,
        auth::{AuthContext, UserID},
        test_utils::{
            assert_redirect, assert_status_ok, assert_valid_html, create_other_user,
            get_test_connection, get_transaction_state, parse_html_document,
        },
        timezone::local_today,
        transaction::{NewTransaction, TransactionKind, ValidationError, create_transaction},
    };

    use super::{StatementQuery, get_statement_page};

    fn add(
        connection: &Connection,
        owner: UserID,
        date: Date,
        kind: TransactionKind,
        amount: f64,
    ) -> i64 {
        create_transaction(
            NewTransaction {
                date,
                kind,
                description: format!("{amount} em {date}"),
                amount,
            },
            owner,
            connection,
        )
        .unwrap()
        .id
    }

    fn custom(start: &str, end: &str) -> StatementQuery {
        StatementQuery {
            periodo: Some("personalizado".to_owned()),
            start_date: Some(start.to_owned()),
            end_date: Some(end.to_owned()),
            tipo_filtro: None,
        }
    }

    fn listed_ids(html: &Html) -> Vec<i64> {
        html.select(&Selector::parse("tr[data-transaction-id]").unwrap())
            .map(|row| {
                row.value()
                    .attr("data-transaction-id")
                    .unwrap()
                    .parse()
                    .unwrap()
            })
            .collect()
    }

    fn card_text(html: &Html, id: &str) -> String {
        html.select(&Selector::parse(&format!("#{id} p")).unwrap())
            .next()
            .unwrap_or_else(|| panic!("No card with ID {id}"))
            .text()
            .collect()
    }

    #[tokio::test]
    async fn defaults_to_current_month() {
        let (connection, user_id) = get_test_connection();
        let today = local_today("Etc/UTC").unwrap();
        let this_month = add(&connection, user_id, today, TransactionKind::Income, 10.0);
        add(
            &connection,
            user_id,
            today - Duration::days(40),
            TransactionKind::Income,
            20.0,
        );
        let state = get_transaction_state(connection);

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(StatementQuery::default()),
        )
        .await
        .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(listed_ids(&html), vec![this_month]);
        assert_eq!(card_text(&html, "total-entrada"), "R$ 10,00");
    }

    #[tokio::test]
    async fn custom_period_lists_newest_first_with_period_totals() {
        let (connection, user_id) = get_test_connection();
        let salary = add(&connection, user_id, date!(2024 - 02 - 01), TransactionKind::Income, 1000.0);
        let rent = add(&connection, user_id, date!(2024 - 02 - 05), TransactionKind::Expense, 400.0);
        let credit = add(&connection, user_id, date!(2024 - 02 - 05), TransactionKind::Credit, 30.0);
        add(&connection, user_id, date!(2024 - 03 - 01), TransactionKind::Income, 50.0);
        let state = get_transaction_state(connection);

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(custom("2024-02-01", "2024-02-29")),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(listed_ids(&html), vec![credit, rent, salary]);
        assert_eq!(card_text(&html, "total-entrada"), "R$ 1.000,00");
        assert_eq!(card_text(&html, "total-saida"), "R$ 400,00");
        assert_eq!(card_text(&html, "total-fiado"), "R$ 30,00");
        assert_eq!(card_text(&html, "saldo"), "R$ 600,00");
    }

    #[tokio::test]
    async fn filters_by_kind() {
        let (connection, user_id) = get_test_connection();
        add(&connection, user_id, date!(2024 - 02 - 01), TransactionKind::Income, 1000.0);
        let rent = add(&connection, user_id, date!(2024 - 02 - 05), TransactionKind::Expense, 400.0);
        let state = get_transaction_state(connection);
        let query = StatementQuery {
            tipo_filtro: Some("saida".to_owned()),
            ..custom("2024-02-01", "2024-02-29")
        };

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(query),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(listed_ids(&html), vec![rent]);
        assert_eq!(card_text(&html, "total-entrada"), "R$ 0,00");
        assert_eq!(card_text(&html, "saldo"), "-R$ 400,00");
    }

    #[tokio::test]
    async fn todos_lists_every_kind() {
        let (connection, user_id) = get_test_connection();
        add(&connection, user_id, date!(2024 - 02 - 01), TransactionKind::Income, 1.0);
        add(&connection, user_id, date!(2024 - 02 - 02), TransactionKind::Expense, 2.0);
        let state = get_transaction_state(connection);
        let query = StatementQuery {
            tipo_filtro: Some("todos".to_owned()),
            ..custom("2024-02-01", "2024-02-29")
        };

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(query),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(listed_ids(&html).len(), 2);
    }

    #[tokio::test]
    async fn custom_period_without_end_redirects_to_current_month() {
        let (connection, user_id) = get_test_connection();
        let state = get_transaction_state(connection);

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(custom("2024-02-01", "")),
        )
        .await
        .unwrap();

        assert_redirect(&response, "/extrato?periodo=mes_atual");
    }

    #[tokio::test]
    async fn custom_period_with_one_malformed_bound_and_one_missing_redirects() {
        for (start, end) in [("garbage", ""), ("", "2024-13-01")] {
            let (connection, user_id) = get_test_connection();
            let state = get_transaction_state(connection);
            let query = StatementQuery {
                periodo: Some("personalizado".to_owned()),
                start_date: (!start.is_empty()).then(|| start.to_owned()),
                end_date: (!end.is_empty()).then(|| end.to_owned()),
                tipo_filtro: None,
            };

            let response = get_statement_page(
                State(state),
                Extension(AuthContext { user_id }),
                Query(query),
            )
            .await
            .unwrap_or_else(|error| panic!("start {start:?}, end {end:?} gave {error:?}"));

            assert_redirect(&response, "/extrato?periodo=mes_atual");
        }
    }

    #[tokio::test]
    async fn unknown_kind_filter_lists_only_that_kind() {
        let (connection, user_id) = get_test_connection();
        add(&connection, user_id, date!(2024 - 02 - 01), TransactionKind::Income, 1000.0);
        let pix = add(
            &connection,
            user_id,
            date!(2024 - 02 - 03),
            TransactionKind::Other("pix".to_owned()),
            99.0,
        );
        let state = get_transaction_state(connection);
        let query = StatementQuery {
            tipo_filtro: Some("pix".to_owned()),
            ..custom("2024-02-01", "2024-02-29")
        };

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(query),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(listed_ids(&html), vec![pix]);
        assert_eq!(card_text(&html, "total-entrada"), "R$ 0,00");
        assert_eq!(card_text(&html, "saldo"), "R$ 0,00");
    }

    #[tokio::test]
    async fn kind_filter_without_matches_lists_nothing() {
        let (connection, user_id) = get_test_connection();
        add(&connection, user_id, date!(2024 - 02 - 01), TransactionKind::Income, 1000.0);
        let state = get_transaction_state(connection);
        let query = StatementQuery {
            tipo_filtro: Some("desconhecido".to_owned()),
            ..custom("2024-02-01", "2024-02-29")
        };

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(query),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert!(listed_ids(&html).is_empty());
        let empty_state = html
            .select(&Selector::parse("td[data-empty-state]").unwrap())
            .count();
        assert_eq!(empty_state, 1);
    }

    #[tokio::test]
    async fn malformed_custom_date_is_bad_request() {
        let (connection, user_id) = get_test_connection();
        let state = get_transaction_state(connection);

        let result = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(custom("2024-02-30", "2024-03-01")),
        )
        .await;

        let error = result.err().unwrap();
        assert_eq!(
            error,
            Error::Validation(ValidationError::InvalidDate("2024-02-30".to_owned()))
        );
        assert_eq!(
            axum::response::IntoResponse::into_response(error).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn inverted_custom_period_lists_nothing() {
        let (connection, user_id) = get_test_connection();
        add(&connection, user_id, date!(2024 - 02 - 15), TransactionKind::Income, 1.0);
        let state = get_transaction_state(connection);

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(custom("2024-02-29", "2024-02-01")),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert!(listed_ids(&html).is_empty());
        let empty_state = html
            .select(&Selector::parse("td[data-empty-state]").unwrap())
            .count();
        assert_eq!(empty_state, 1);
    }

    #[tokio::test]
    async fn lists_only_own_transactions() {
        let (connection, user_id) = get_test_connection();
        let other_user = create_other_user(&connection);
        let mine = add(&connection, user_id, date!(2024 - 02 - 10), TransactionKind::Income, 1.0);
        add(&connection, other_user, date!(2024 - 02 - 11), TransactionKind::Income, 2.0);
        let state = get_transaction_state(connection);

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(custom("2024-02-01", "2024-02-29")),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(listed_ids(&html), vec![mine]);
    }

    #[tokio::test]
    async fn unknown_kinds_are_listed_but_not_summed() {
        let (connection, user_id) = get_test_connection();
        let pix = add(
            &connection,
            user_id,
            date!(2024 - 02 - 10),
            TransactionKind::Other("pix".to_owned()),
            99.0,
        );
        let state = get_transaction_state(connection);

        let response = get_statement_page(
            State(state),
            Extension(AuthContext { user_id }),
            Query(custom("2024-02-01", "2024-02-29")),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(listed_ids(&html), vec![pix]);
        assert_eq!(card_text(&html, "saldo"), "R$ 0,00");
    }
}
