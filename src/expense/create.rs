//! Page and endpoint for adding an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error, endpoints,
    expense::form::{ExpenseForm, FormAction, expense_form_view},
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    ledger::ExpenseBook,
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct NewExpensePageState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for NewExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The state needed for adding an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseEndpointState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl FromRef<AppState> for CreateExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
        }
    }
}

/// Render the page for adding an expense, with the date set to today.
pub async fn get_new_expense_page(
    State(state): State<NewExpensePageState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let categories = state
        .expense_book
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire expense book lock: {error}"))
        .map_err(|_| Error::LockError)?
        .categories();

    Ok(new_expense_view(&ExpenseForm::with_date(today), &categories).into_response())
}

/// Handle the new expense form submission.
///
/// Input that is not a valid expense re-renders the form with an error message.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseEndpointState>,
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
        .and_then(|record| expense_book.add_expense(record));

    match result {
        Ok(id) => {
            tracing::info!("Added expense {id}");
            (
                HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(
            error @ (Error::InvalidDate(_) | Error::InvalidAmount(_) | Error::NonPositiveAmount(_)),
        ) => new_expense_form_view(&form, &expense_book.categories(), &format!("Error: {error}"))
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while adding an expense: {error}");
            error.into_alert_response()
        }
    }
}

fn new_expense_view(values: &ExpenseForm, categories: &[String]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let form = new_expense_form_view(values, categories, "");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-6" { "Add Expense" }
            (form)
        }
    };

    base("Add Expense", &[dollar_input_styles()], &content)
}

fn new_expense_form_view(values: &ExpenseForm, categories: &[String], error_message: &str) -> Markup {
    expense_form_view(
        FormAction::Post(endpoints::POST_EXPENSE),
        values,
        categories,
        "Add Expense",
        error_message,
    )
}
