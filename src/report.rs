//! Monthly report of spending against budget for each category.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    aggregation::YearMonth,
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    ledger::ExpenseBook,
    navigation::NavBar,
    timezone::current_month,
};

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportsPageState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    /// The month to report on as `YYYY-MM`. Defaults to the current month.
    pub month: Option<String>,
}

/// One category's line in a [MonthlyReport].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub category: String,
    pub total: f64,
    /// The category's budget, zero if none has been set.
    pub budget: f64,
    /// `total - budget`, positive when spending went over the budget.
    pub variance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub month: YearMonth,
    /// One row per category with spending in `month`, sorted by category.
    pub rows: Vec<ReportRow>,
    pub total: f64,
}

impl MonthlyReport {
    pub fn new(expense_book: &ExpenseBook, month: YearMonth) -> Self {
        let budgets = expense_book.budgets();

        let rows: Vec<ReportRow> = expense_book
            .monthly_totals(month)
            .into_iter()
            .map(|(category, total)| {
                let budget = budgets.get(&category).copied().unwrap_or(0.0);

                ReportRow {
                    category,
                    total,
                    budget,
                    variance: total - budget,
                }
            })
            .collect();

        let total = rows.iter().map(|row| row.total).sum();

        Self { month, rows, total }
    }
}

/// Render the report for the requested month.
///
/// An invalid month shows an error above the report for the current month.
pub async fn get_reports_page(
    State(state): State<ReportsPageState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let (month, error_message) = match query.month.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => match YearMonth::from_str(text) {
            Ok(month) => (month, None),
            Err(error) => (
                current_month(&state.local_timezone)?,
                Some(format!("Error: {error}")),
            ),
        },
        _ => (current_month(&state.local_timezone)?, None),
    };

    let expense_book = state
        .expense_book
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire expense book lock: {error}"))
        .map_err(|_| Error::LockError)?;

    let report = MonthlyReport::new(&expense_book, month);

    Ok(reports_view(&report, error_message.as_deref()).into_response())
}

fn reports_view(report: &MonthlyReport, error_message: Option<&str>) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();

    let variance_style = |variance: f64| {
        if variance > 0.0 {
            "text-red-600 dark:text-red-400"
        } else {
            "text-green-600 dark:text-green-400"
        }
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Report for " (report.month) }

                form
                    method="get"
                    action=(endpoints::REPORTS_VIEW)
                    class="flex items-end gap-2"
                {
                    div
                    {
                        label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                        input
                            type="month"
                            id="month"
                            name="month"
                            value=(report.month)
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Show" }
                }

                @if let Some(error_message) = error_message {
                    p class="text-red-500 text-base" { (error_message) }
                }

                table id="report" class="w-full text-sm text-left rtl:text-right
                    text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Variance" }
                        }
                    }

                    tbody
                    {
                        @for row in &report.rows {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (row.category) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(row.total)) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(row.budget)) }
                                td class={ (TABLE_CELL_STYLE) " " (variance_style(row.variance)) }
                                {
                                    (format_currency(row.variance))
                                }
                            }
                        }

                        @if report.rows.is_empty() {
                            tr
                            {
                                td
                                    colspan="4"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No expenses in " (report.month) "."
                                }
                            }
                        }
                    }

                    tfoot
                    {
                        tr class="font-semibold text-gray-900 dark:text-white"
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                            td id="report-total" class=(TABLE_CELL_STYLE)
                            {
                                (format_currency(report.total))
                            }
                        }
                    }
                }
            }
        }
    );

    base("Reports", &[], &content)
}
