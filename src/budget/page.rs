//! Budgets page with the forms for setting budgets and adding categories.

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
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        dollar_input_styles, format_currency,
    },
    ledger::ExpenseBook,
    navigation::NavBar,
    timezone::current_month,
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A category with its budget and spending for the current month.
struct BudgetRow {
    category: String,
    budget: Option<f64>,
    spent: f64,
}

/// Render the budgets page.
pub async fn get_budgets_page(State(state): State<BudgetsPageState>) -> Result<Response, Error> {
    let month = current_month(&state.local_timezone)?;

    let expense_book = state
        .expense_book
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire expense book lock: {error}"))
        .map_err(|_| Error::LockError)?;

    let totals = expense_book.monthly_totals(month);
    let categories = expense_book.categories();
    let rows: Vec<BudgetRow> = categories
        .iter()
        .map(|category| BudgetRow {
            category: category.clone(),
            budget: expense_book.budgets().get(category).copied(),
            spent: totals.get(category).copied().unwrap_or(0.0),
        })
        .collect();

    Ok(budgets_view(month, &rows, &categories).into_response())
}

fn budgets_view(month: YearMonth, rows: &[BudgetRow], categories: &[String]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Budgets" }

                table class="w-full text-sm text-left rtl:text-right
                    text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Monthly Budget" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Spent in " (month) }
                        }
                    }

                    tbody
                    {
                        @for row in rows {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    span class=(CATEGORY_BADGE_STYLE) { (row.category) }
                                }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    @match row.budget {
                                        Some(budget) => { (format_currency(budget)) }
                                        None => span class="italic" { "Not set" }
                                    }
                                }

                                td class=(TABLE_CELL_STYLE) { (format_currency(row.spent)) }
                            }
                        }
                    }
                }

                div class="grid gap-8 lg:grid-cols-2"
                {
                    section
                    {
                        h2 class="text-lg font-semibold mb-4" { "Set Budget" }
                        (budget_form_view(categories, "", "", ""))
                    }

                    section
                    {
                        h2 class="text-lg font-semibold mb-4" { "Add Category" }
                        (category_form_view("", ""))
                    }
                }
            }
        }
    );

    base("Budgets", &[dollar_input_styles()], &content)
}

/// The form for setting a category's budget.
pub(super) fn budget_form_view(
    categories: &[String],
    category: &str,
    budget: &str,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_BUDGET)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4"
        {
            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    id="category"
                    type="text"
                    name="category"
                    list="budget-categories"
                    placeholder="Food"
                    value=(category)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                datalist id="budget-categories"
                {
                    @for category in categories {
                        option value=(category) {}
                    }
                }
            }

            div
            {
                label for="budget" class=(FORM_LABEL_STYLE) { "Monthly Budget" }

                div class="input-wrapper w-full"
                {
                    input
                        id="budget"
                        type="number"
                        name="budget"
                        min="0"
                        step="0.01"
                        placeholder="0.00"
                        value=(budget)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Set Budget" }
        }
    }
}

/// The form for adding a category to the selectable list.
pub(super) fn category_form_view(name: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category Name"
                    value=(name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    }
}
