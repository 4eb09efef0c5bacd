//! The transaction form shared by the dashboard and the edit page, and the
//! validation of its submitted values.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    html::{FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::{NewTransaction, Transaction, TransactionKind},
};

/// The date format used by HTML date inputs, e.g. "2024-02-29".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A problem with a value submitted in a form or query string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was missing or blank.
    #[error("o campo {0} é obrigatório")]
    MissingField(&'static str),

    /// A date was not in the YYYY-MM-DD format or does not exist.
    #[error("\"{0}\" não é uma data válida, use o formato 2024-02-29")]
    InvalidDate(String),

    /// An amount was not a finite number.
    #[error("\"{0}\" não é um valor válido")]
    InvalidAmount(String),

    /// An amount was below zero. The sign of a transaction comes from its kind.
    #[error("o valor não pode ser negativo")]
    NegativeAmount,
}

/// Parse a date from an HTML date input.
///
/// # Errors
///
/// Returns [ValidationError::InvalidDate] if `raw_date` is not a real date
/// in the YYYY-MM-DD format.
pub fn parse_date(raw_date: &str) -> Result<Date, ValidationError> {
    let raw_date = raw_date.trim();

    Date::parse(raw_date, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate(raw_date.to_owned()))
}

fn parse_amount(raw_amount: &str) -> Result<f64, ValidationError> {
    let raw_amount = raw_amount.trim();
    let amount: f64 = raw_amount
        .parse()
        .map_err(|_| ValidationError::InvalidAmount(raw_amount.to_owned()))?;

    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount(raw_amount.to_owned()));
    }

    if amount < 0.0 {
        return Err(ValidationError::NegativeAmount);
    }

    Ok(amount)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// The raw values submitted with the transaction form.
///
/// Every field is optional text so that a bad submission can be shown back
/// to the user exactly as it was entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// The transaction date as YYYY-MM-DD.
    #[serde(rename = "data_transacao", default)]
    pub date: Option<String>,
    /// The transaction kind, e.g. "entrada".
    #[serde(rename = "tipo", default)]
    pub kind: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    /// The amount as a decimal number with a dot separator.
    #[serde(rename = "valor", default)]
    pub amount: Option<String>,
}

impl TransactionForm {
    /// Validate the submitted values.
    ///
    /// A blank date is replaced with `default_date`, pass `None` to make the
    /// date required.
    ///
    /// # Errors
    ///
    /// Returns the first [ValidationError] found, checking the date, kind,
    /// description and amount in that order.
    pub fn validate(&self, default_date: Option<Date>) -> Result<NewTransaction, ValidationError> {
        let date = match (non_blank(self.date.as_deref()), default_date) {
            (Some(raw_date), _) => parse_date(raw_date)?,
            (None, Some(default_date)) => default_date,
            (None, None) => return Err(ValidationError::MissingField("data")),
        };

        let kind: TransactionKind = non_blank(self.kind.as_deref())
            .ok_or(ValidationError::MissingField("tipo"))?
            .parse()?;

        let description = non_blank(self.description.as_deref())
            .ok_or(ValidationError::MissingField("descrição"))?
            .to_owned();

        let amount = non_blank(self.amount.as_deref())
            .ok_or(ValidationError::MissingField("valor"))
            .and_then(parse_amount)?;

        Ok(NewTransaction {
            date,
            kind,
            description,
            amount,
        })
    }
}

impl From<&Transaction> for TransactionForm {
    fn from(transaction: &Transaction) -> Self {
        Self {
            date: Some(transaction.date.to_string()),
            kind: Some(transaction.kind.as_str().to_owned()),
            description: Some(transaction.description.clone()),
            amount: Some(format!("{:.2}", transaction.amount)),
        }
    }
}

/// The inputs of the transaction form, without the surrounding form element.
///
/// The date is only marked as required when `date_required` is set, the add
/// form falls back to today's date.
pub fn transaction_form_fields(
    values: &TransactionForm,
    date_required: bool,
    error: Option<&ValidationError>,
) -> Markup {
    let selected_kind = values
        .kind
        .as_deref()
        .and_then(|raw_kind| raw_kind.parse::<TransactionKind>().ok())
        .unwrap_or(TransactionKind::Income);
    let error_message = error.map(|error| crate::capitalise_first_char(&error.to_string()));

    html! {
        div
        {
            label for="data_transacao" class=(FORM_LABEL_STYLE) { "Data" }

            input
                type="date"
                name="data_transacao"
                id="data_transacao"
                class=(FORM_TEXT_INPUT_STYLE)
                value=[values.date.as_deref()]
                required[date_required];
        }

        div
        {
            label for="tipo" class=(FORM_LABEL_STYLE) { "Tipo" }

            select name="tipo" id="tipo" class=(FORM_TEXT_INPUT_STYLE) required
            {
                @for kind in TransactionKind::RECOGNISED {
                    option value=(kind.as_str()) selected[kind == selected_kind] { (kind.label()) }
                }

                @if !selected_kind.is_recognised() {
                    option value=(selected_kind.as_str()) selected { (selected_kind.label()) }
                }
            }
        }

        div
        {
            label for="descricao" class=(FORM_LABEL_STYLE) { "Descrição" }

            input
                type="text"
                name="descricao"
                id="descricao"
                placeholder="Descrição"
                class=(FORM_TEXT_INPUT_STYLE)
                value=[values.description.as_deref()]
                required;
        }

        div
        {
            label for="valor" class=(FORM_LABEL_STYLE) { "Valor (R$)" }

            input
                type="number"
                name="valor"
                id="valor"
                step="0.01"
                min="0"
                placeholder="0.00"
                class=(FORM_TEXT_INPUT_STYLE)
                value=[values.amount.as_deref()]
                required;
        }

        @if let Some(error_message) = error_message {
            p class=(FORM_ERROR_STYLE) id="form-error" { (error_message) }
        }
    }
}
