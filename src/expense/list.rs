//! Expenses listing page with search, sort and undo controls.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    expense::{Expense, SortColumn},
    html::{
        BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links, format_currency,
    },
    ledger::ExpenseBook,
    navigation::NavBar,
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
        }
    }
}

/// The query parameters for the expenses page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpensesQuery {
    /// Only show expenses whose category or description contains this text.
    pub q: Option<String>,
}

/// Render the expenses page, filtered by the search query if one is given.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let expense_book = state
        .expense_book
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire expense book lock: {error}"))
        .map_err(|_| Error::LockError)?;

    let search = query.q.unwrap_or_default();
    let expenses = expense_book.search(&search);

    Ok(expenses_view(&expenses, &search, expense_book.can_undo()).into_response())
}

fn expenses_view(expenses: &[&Expense], search: &str, can_undo: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let table_row = |expense: &Expense| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id);
        let confirm_message = format!(
            "Are you sure you want to delete the expense '{}' on {}?",
            expense.record.description, expense.record.date
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (expense.record.date) }

                td class=(TABLE_CELL_STYLE)
                {
                    @if !expense.record.category.is_empty() {
                        span class=(CATEGORY_BADGE_STYLE) { (expense.record.category) }
                    }
                }

                td class=(TABLE_CELL_STYLE) { (format_currency(expense.record.amount)) }

                td class=(TABLE_CELL_STYLE) { (expense.record.description) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add Expense" }
                }

                div class="flex flex-wrap items-end gap-4"
                {
                    form
                        method="get"
                        action=(endpoints::EXPENSES_VIEW)
                        role="search"
                        class="flex gap-2"
                    {
                        input
                            type="search"
                            name="q"
                            value=(search)
                            placeholder="Search category or description"
                            aria-label="Search expenses"
                            class=(FORM_TEXT_INPUT_STYLE);

                        button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Search" }
                    }

                    form
                        hx-post=(endpoints::SORT_EXPENSES)
                        hx-target-error="#alert-container"
                        class="flex gap-2"
                    {
                        select name="column" aria-label="Sort by" class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for column in SortColumn::ALL {
                                option value=(column) { (column) }
                            }
                        }

                        button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Sort" }
                    }

                    button
                        type="button"
                        hx-post=(endpoints::UNDO)
                        hx-target-error="#alert-container"
                        disabled[!can_undo]
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Undo"
                    }
                }

                table class="w-full text-sm text-left rtl:text-right
                    text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            @for column in SortColumn::ALL {
                                th scope="col" class=(TABLE_CELL_STYLE) { (column) }
                            }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for expense in expenses {
                            (table_row(*expense))
                        }

                        @if expenses.is_empty() {
                            tr
                            {
                                td
                                    colspan="5"
                                    class="px-6 py-4 text-center
                                        text-gray-500 dark:text-gray-400"
                                {
                                    @if search.is_empty() {
                                        "No expenses recorded yet. "
                                        a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                                        {
                                            "Add your first expense"
                                        }
                                    } @else {
                                        "No expenses match \"" (search) "\"."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Expenses", &[], &content)
}
