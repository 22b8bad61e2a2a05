//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use crate::{Error, ledger::ExpenseBook, timezone::get_local_offset};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The expense table and budgets, shared by every request.
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl AppState {
    /// Create a new [AppState] that serves `expense_book`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if `local_timezone` is not a known timezone.
    pub fn new(expense_book: ExpenseBook, local_timezone: &str) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            expense_book: Arc::new(Mutex::new(expense_book)),
        })
    }
}
