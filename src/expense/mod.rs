//! Recording, listing, editing, deleting and sorting expenses.

mod create;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod sort;

pub use create::{create_expense_endpoint, get_new_expense_page};
pub use delete::delete_expense_endpoint;
pub use domain::{Expense, ExpenseId, ExpenseRecord, ExpenseTable, SortColumn};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use list::get_expenses_page;
pub use sort::sort_expenses_endpoint;
