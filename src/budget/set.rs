//! Endpoint for setting a category's monthly budget.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    AppState, Error,
    budget::{BudgetForm, page::budget_form_view},
    endpoints,
    ledger::ExpenseBook,
};

/// The state needed for setting a budget.
#[derive(Debug, Clone)]
pub struct SetBudgetEndpointState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl FromRef<AppState> for SetBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
        }
    }
}

/// Handle the budget form submission.
///
/// Invalid input re-renders the form with an error message.
pub async fn set_budget_endpoint(
    State(state): State<SetBudgetEndpointState>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let mut expense_book = match state.expense_book.lock() {
        Ok(expense_book) => expense_book,
        Err(error) => {
            tracing::error!("could not acquire expense book lock: {error}");
            return Error::LockError.into_alert_response();
        }
    };

    match expense_book.set_budget(&form.category, &form.budget) {
        Ok(()) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::EmptyCategoryName | Error::InvalidBudget(_))) => budget_form_view(
            &expense_book.categories(),
            &form.category,
            &form.budget,
            &format!("Error: {error}"),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while setting a budget: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod set_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use tempfile::TempDir;

    use crate::{
        budget::{BudgetForm, BudgetMap},
        endpoints,
        ledger::test_support::temp_expense_book,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_fragment,
        },
    };

    use super::{SetBudgetEndpointState, set_budget_endpoint};

    fn get_state() -> (SetBudgetEndpointState, TempDir) {
        let (book, dir) = temp_expense_book();

        (
            SetBudgetEndpointState {
                expense_book: Arc::new(Mutex::new(book)),
            },
            dir,
        )
    }

    fn form(category: &str, budget: &str) -> Form<BudgetForm> {
        Form(BudgetForm {
            category: category.to_owned(),
            budget: budget.to_owned(),
        })
    }

    #[tokio::test]
    async fn can_set_budget() {
        let (state, _dir) = get_state();

        let response = set_budget_endpoint(State(state.clone()), form(" Food ", "300")).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BUDGETS_VIEW);
        assert_eq!(
            state.expense_book.lock().unwrap().budgets(),
            &BudgetMap::from([("Food".to_owned(), 300.0)])
        );
    }

    #[tokio::test]
    async fn negative_budget_renders_form_error() {
        let (state, _dir) = get_state();

        let response = set_budget_endpoint(State(state.clone()), form("Food", "-10")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: \"-10\" is not a valid budget, the budget must be zero or more",
        );
        assert!(state.expense_book.lock().unwrap().budgets().is_empty());
    }

    #[tokio::test]
    async fn empty_category_renders_form_error() {
        let (state, _dir) = get_state();

        let response = set_budget_endpoint(State(state), form("   ", "10")).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Category name cannot be empty");
    }
}
