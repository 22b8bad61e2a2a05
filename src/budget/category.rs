//! Endpoint for adding a category to the list offered on the expense form.

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
    budget::{CategoryForm, page::category_form_view},
    endpoints,
    ledger::ExpenseBook,
};

/// The state needed for adding a category.
#[derive(Debug, Clone)]
pub struct AddCategoryEndpointState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl FromRef<AppState> for AddCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
        }
    }
}

pub async fn add_category_endpoint(
    State(state): State<AddCategoryEndpointState>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let mut expense_book = match state.expense_book.lock() {
        Ok(expense_book) => expense_book,
        Err(error) => {
            tracing::error!("could not acquire expense book lock: {error}");
            return Error::LockError.into_alert_response();
        }
    };

    match expense_book.add_category(&form.name) {
        Ok(name) => {
            tracing::info!("Added category {name}");
            (
                HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => category_form_view(&form.name, &format!("Error: {error}")).into_response(),
    }
}
