//! Endpoint for re-sorting the expense table.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{AppState, Error, endpoints, expense::SortColumn, ledger::ExpenseBook};

/// The state needed for sorting expenses.
#[derive(Debug, Clone)]
pub struct SortExpensesEndpointState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl FromRef<AppState> for SortExpensesEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SortForm {
    pub column: String,
}

/// Sort the expense table by the submitted column and reload the expenses page.
///
/// The new row order is saved and can be undone.
pub async fn sort_expenses_endpoint(
    State(state): State<SortExpensesEndpointState>,
    Form(form): Form<SortForm>,
) -> Response {
    let column = match SortColumn::from_str(&form.column) {
        Ok(column) => column,
        Err(error) => return error.into_alert_response(),
    };

    let mut expense_book = match state.expense_book.lock() {
        Ok(expense_book) => expense_book,
        Err(error) => {
            tracing::error!("could not acquire expense book lock: {error}");
            return Error::LockError.into_alert_response();
        }
    };

    match expense_book.sort_expenses(column) {
        Ok(()) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while sorting by {column}: {error}");
            error.into_alert_response()
        }
    }
}
