//! Page and endpoint for editing an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error, endpoints,
    expense::{
        ExpenseId,
        form::{ExpenseForm, FormAction, expense_form_view},
    },
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    ledger::ExpenseBook,
    navigation::NavBar,
};

/// The state needed for editing an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
        }
    }
}

/// Render the page for editing the expense `expense_id`.
///
/// Responds with the 404 page if there is no such expense.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
) -> Result<Response, Error> {
    let expense_book = state
        .expense_book
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire expense book lock: {error}"))
        .map_err(|_| Error::LockError)?;

    let expense = expense_book.expenses().get(expense_id).ok_or(Error::NotFound)?;
    let values = ExpenseForm::from_record(&expense.record);

    Ok(edit_expense_view(expense_id, &values, &expense_book.categories()).into_response())
}

/// Handle the edit expense form submission.
pub async fn update_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let mut expense_book = match state.expense_book.lock() {
        Ok(expense_book) => expense_book,
        Err(error) => {
            tracing::error!("could not acquire expense book lock: {error}");
            return Error::LockError.into_alert_response();
        }
    };

    let result = form
        .parse()
        .and_then(|record| expense_book.edit_expense(expense_id, record));

    match result {
        Ok(()) => {
            tracing::info!("Updated expense {expense_id}");
            (
                HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(
            error @ (Error::InvalidDate(_) | Error::InvalidAmount(_) | Error::NonPositiveAmount(_)),
        ) => edit_expense_form_view(
            expense_id,
            &form,
            &expense_book.categories(),
            &format!("Error: {error}"),
        )
        .into_response(),
        Err(error @ Error::UpdateMissingExpense(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_expense_view(expense_id: ExpenseId, values: &ExpenseForm, categories: &[String]) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense_id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = edit_expense_form_view(expense_id, values, categories, "");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-6" { "Edit Expense" }
            (form)
        }
    };

    base("Edit Expense", &[dollar_input_styles()], &content)
}

fn edit_expense_form_view(
    expense_id: ExpenseId,
    values: &ExpenseForm,
    categories: &[String],
    error_message: &str,
) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_EXPENSE, expense_id);

    expense_form_view(
        FormAction::Put(&update_endpoint),
        values,
        categories,
        "Save Changes",
        error_message,
    )
}
