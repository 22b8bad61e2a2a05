//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{expense_id}/edit', use [format_endpoint].

use crate::expense::ExpenseId;

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// This month's spending, budget alerts and recent expenses.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing and searching expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for adding an expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The page listing budgets and categories.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The monthly report of spending against budgets.
pub const REPORTS_VIEW: &str = "/reports";
/// The page for exporting expenses to a workbook.
pub const EXPORT_VIEW: &str = "/export";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to add an expense.
pub const POST_EXPENSE: &str = "/api/expenses";
/// The route to update an expense.
pub const PUT_EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to delete an expense.
pub const DELETE_EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to sort the expense table.
pub const SORT_EXPENSES: &str = "/api/expenses/sort";
/// The route to undo the last change to the expense table.
pub const UNDO: &str = "/api/undo";
/// The route to set a budget.
pub const POST_BUDGET: &str = "/api/budgets";
/// The route to add a category.
pub const POST_CATEGORY: &str = "/api/categories";
/// The route to export expenses to a file.
pub const EXPORT_API: &str = "/api/export";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: ExpenseId) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
