//! Dashboard with this month's spending, budget alerts and recent expenses.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    aggregation::YearMonth,
    endpoints,
    expense::Expense,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    ledger::ExpenseBook,
    navigation::NavBar,
    timezone::current_month,
};

/// How many of the latest expenses to show.
const RECENT_EXPENSE_COUNT: usize = 5;

/// The fraction of a budget above which a category is flagged as nearing it.
const NEARING_BUDGET_RATIO: f64 = 0.8;

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// Spending is above the budget.
    Over,
    /// Spending is above [NEARING_BUDGET_RATIO] of the budget.
    Nearing,
}

/// A budgeted category whose spending is over or close to its budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    pub category: String,
    pub spent: f64,
    pub budget: f64,
    pub status: BudgetStatus,
}

/// The figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub month: YearMonth,
    /// Total spending in `month` across all categories.
    pub spent: f64,
    /// The sum of all budgets minus `spent`.
    pub remaining: f64,
    pub alerts: Vec<BudgetAlert>,
    /// The last few rows of the expense table, in table order.
    pub recent: Vec<Expense>,
}

impl DashboardSummary {
    pub fn new(expense_book: &ExpenseBook, month: YearMonth) -> Self {
        let totals = expense_book.monthly_totals(month);
        let budgets = expense_book.budgets();

        let spent: f64 = totals.values().sum();
        let remaining = budgets.values().sum::<f64>() - spent;

        let alerts = totals
            .iter()
            .filter_map(|(category, &spent)| {
                let budget = *budgets.get(category)?;

                let status = if spent > budget {
                    BudgetStatus::Over
                } else if spent > NEARING_BUDGET_RATIO * budget {
                    BudgetStatus::Nearing
                } else {
                    return None;
                };

                Some(BudgetAlert {
                    category: category.clone(),
                    spent,
                    budget,
                    status,
                })
            })
            .collect();

        Self {
            month,
            spent,
            remaining,
            alerts,
            recent: expense_book.expenses().tail(RECENT_EXPENSE_COUNT).to_vec(),
        }
    }
}

/// Display this month's spending against the budgets.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let month = current_month(&state.local_timezone)?;

    let expense_book = state
        .expense_book
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire expense book lock: {error}"))
        .map_err(|_| Error::LockError)?;

    let summary = DashboardSummary::new(&expense_book, month);

    Ok(dashboard_view(&summary).into_response())
}

fn dashboard_view(summary: &DashboardSummary) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let alert_style = |status: BudgetStatus| match status {
        BudgetStatus::Over => {
            "p-4 text-sm text-red-800 rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400"
        }
        BudgetStatus::Nearing => {
            "p-4 text-sm text-yellow-800 rounded-lg bg-yellow-50 dark:bg-gray-800 dark:text-yellow-300"
        }
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Dashboard for " (summary.month) }

                div class="grid gap-4 sm:grid-cols-2"
                {
                    div id="spent" class="p-6 rounded-lg bg-white dark:bg-gray-800 shadow"
                    {
                        h2 class="text-sm text-gray-500 dark:text-gray-400" { "Expenses" }
                        p class="text-2xl font-bold" { (format_currency(summary.spent)) }
                    }

                    div id="remaining" class="p-6 rounded-lg bg-white dark:bg-gray-800 shadow"
                    {
                        h2 class="text-sm text-gray-500 dark:text-gray-400" { "Remaining" }
                        p class="text-2xl font-bold" { (format_currency(summary.remaining)) }
                    }
                }

                @if !summary.alerts.is_empty() {
                    ul id="budget-alerts" class="space-y-2"
                    {
                        @for alert in &summary.alerts {
                            li class=(alert_style(alert.status)) role="alert"
                            {
                                @match alert.status {
                                    BudgetStatus::Over => { "Over budget in " }
                                    BudgetStatus::Nearing => { "Nearing budget in " }
                                }
                                (alert.category) ": "
                                (format_currency(alert.spent)) " of " (format_currency(alert.budget))
                            }
                        }
                    }
                }

                section
                {
                    header class="flex justify-between items-end mb-2"
                    {
                        h2 class="text-lg font-semibold" { "Recent Expenses" }
                        a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add Expense" }
                    }

                    @if summary.recent.is_empty() {
                        p
                        {
                            "No expenses yet. "
                            (link(endpoints::NEW_EXPENSE_VIEW, "Add your first expense"))
                        }
                    } @else {
                        (recent_expenses_table(&summary.recent))
                    }
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn recent_expenses_table(expenses: &[Expense]) -> Markup {
    html!(
        table id="recent-expenses" class="w-full text-sm text-left rtl:text-right
            text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                }
            }

            tbody
            {
                @for expense in expenses {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (expense.record.date) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            span class=(CATEGORY_BADGE_STYLE) { (expense.record.category) }
                        }
                        td class=(TABLE_CELL_STYLE) { (format_currency(expense.record.amount)) }
                        td class=(TABLE_CELL_STYLE) { (expense.record.description) }
                    }
                }
            }
        }
    )
}
