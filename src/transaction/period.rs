//! Named statement periods and the date ranges they cover.

use std::fmt::Display;

use time::{Date, Duration};

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} a {}", self.start, self.end)
    }
}

/// The statement periods a user can pick from.
///
/// Query strings use the Portuguese names, the English names are accepted
/// as aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    /// From the Monday to the Sunday of the current week.
    CurrentWeek,
    /// Today and the six days before it.
    Last7Days,
    /// Today and the fourteen days before it.
    Last15Days,
    /// Dates chosen by the user.
    Custom,
    /// From the first to the last day of the current month.
    #[default]
    CurrentMonth,
}

impl Period {
    /// Every period, in the order they are offered to the user.
    pub const ALL: [Period; 5] = [
        Period::CurrentMonth,
        Period::CurrentWeek,
        Period::Last7Days,
        Period::Last15Days,
        Period::Custom,
    ];

    /// Parse a query string value, falling back to the current month for
    /// anything unrecognised.
    pub fn from_query_value(raw_period: Option<&str>) -> Self {
        match raw_period.map(str::trim) {
            Some("semana_atual" | "current_week") => Period::CurrentWeek,
            Some("ultimos_7_dias" | "last_7_days") => Period::Last7Days,
            Some("ultimos_15_dias" | "last_15_days") => Period::Last15Days,
            Some("personalizado" | "custom") => Period::Custom,
            _ => Period::CurrentMonth,
        }
    }

    /// The value used for this period in query strings.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Period::CurrentWeek => "semana_atual",
            Period::Last7Days => "ultimos_7_dias",
            Period::Last15Days => "ultimos_15_dias",
            Period::Custom => "personalizado",
            Period::CurrentMonth => "mes_atual",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::CurrentWeek => "Semana atual",
            Period::Last7Days => "Últimos 7 dias",
            Period::Last15Days => "Últimos 15 dias",
            Period::Custom => "Personalizado",
            Period::CurrentMonth => "Mês atual",
        }
    }
}

/// Returned when a custom period is missing one of its bounds.
///
/// The statement page answers this by redirecting to the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeedsRedirect;

/// Work out the dates covered by `period`, relative to `today`.
///
/// `explicit_start` and `explicit_end` are only used by [Period::Custom].
/// The range may be inverted if the user picked an end before the start,
/// in which case it contains no dates.
///
/// # Errors
///
/// Returns [NeedsRedirect] for a custom period without both bounds.
pub fn resolve(
    period: Period,
    explicit_start: Option<Date>,
    explicit_end: Option<Date>,
    today: Date,
) -> Result<DateRange, NeedsRedirect> {
    let range = match period {
        Period::CurrentWeek => {
            let start = today - Duration::days(today.weekday().number_days_from_monday().into());
            DateRange {
                start,
                end: start + Duration::days(6),
            }
        }
        Period::Last7Days => DateRange {
            start: today - Duration::days(6),
            end: today,
        },
        Period::Last15Days => DateRange {
            start: today - Duration::days(14),
            end: today,
        },
        Period::Custom => match (explicit_start, explicit_end) {
            (Some(start), Some(end)) => DateRange { start, end },
            _ => return Err(NeedsRedirect),
        },
        Period::CurrentMonth => {
            let start = first_of_month(today);
            // 32 days past the first always lands in the next month.
            let end = first_of_month(start + Duration::days(32)) - Duration::days(1);
            DateRange { start, end }
        }
    };

    Ok(range)
}

fn first_of_month(date: Date) -> Date {
    // Every month has a first day.
    date.replace_day(1).unwrap_or(date)
}
