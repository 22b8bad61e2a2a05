//! Monthly budgets per category and the list of selectable categories.

mod category;
mod page;
mod set;

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::Error;

pub use category::add_category_endpoint;
pub use page::get_budgets_page;
pub use set::set_budget_endpoint;

/// Monthly spending limit per category, ordered by category name.
pub type BudgetMap = BTreeMap<String, f64>;

/// Parse a budget as a finite number that is zero or more.
///
/// # Errors
/// Returns [Error::InvalidBudget] for anything else.
pub fn parse_budget(text: &str) -> Result<f64, Error> {
    match text.trim().parse::<f64>() {
        Ok(budget) if budget.is_finite() && budget >= 0.0 => Ok(budget),
        _ => Err(Error::InvalidBudget(text.to_owned())),
    }
}

/// The form data for setting a budget.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetForm {
    pub category: String,
    pub budget: String,
}

/// The form data for adding a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}
