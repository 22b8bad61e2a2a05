//! Expense deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};

use crate::{AppState, Error, alert::Alert, expense::ExpenseId, ledger::ExpenseBook};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseEndpointState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl FromRef<AppState> for DeleteExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
        }
    }
}

/// Handle expense deletion. Returns success alert or error.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseEndpointState>,
) -> Response {
    let mut expense_book = match state.expense_book.lock() {
        Ok(expense_book) => expense_book,
        Err(error) => {
            tracing::error!("could not acquire expense book lock: {error}");
            return Error::LockError.into_alert_response();
        }
    };

    match expense_book.delete_expense(expense_id) {
        Ok(expense) => {
            tracing::info!("Deleted expense {expense_id}: {:?}", expense.record);
            Alert::SuccessSimple {
                message: "Expense deleted".to_owned(),
            }
            .into_response()
        }
        Err(error @ Error::DeleteMissingExpense(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
