//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    budget::{add_category_endpoint, get_budgets_page, set_budget_endpoint},
    dashboard::get_dashboard_page,
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_edit_expense_page,
        get_expenses_page, get_new_expense_page, sort_expenses_endpoint, update_expense_endpoint,
    },
    export::{export_endpoint, get_export_page},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::get_reports_page,
    undo::undo_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::EXPORT_VIEW, get(get_export_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(endpoints::POST_EXPENSE, post(create_expense_endpoint))
        .route(
            endpoints::PUT_EXPENSE,
            put(update_expense_endpoint).delete(delete_expense_endpoint),
        )
        .route(endpoints::SORT_EXPENSES, post(sort_expenses_endpoint))
        .route(endpoints::UNDO, post(undo_endpoint))
        .route(endpoints::POST_BUDGET, post(set_budget_endpoint))
        .route(endpoints::POST_CATEGORY, post(add_category_endpoint))
        .route(endpoints::EXPORT_API, post(export_endpoint));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
