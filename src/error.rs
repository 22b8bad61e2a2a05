//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, expense::ExpenseId, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The date text was not a real calendar date in the format `YYYY-MM-DD`.
    #[error("\"{0}\" is not a valid date, use the format YYYY-MM-DD")]
    InvalidDate(String),

    /// The amount text could not be parsed as a finite number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The amount of an expense was zero or negative.
    ///
    /// Such an amount passes field validation but is never inserted into the
    /// expense table.
    #[error("the amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),

    /// The month text was not a valid month in the format `YYYY-MM`.
    #[error("\"{0}\" is not a valid month, use the format YYYY-MM")]
    InvalidMonth(String),

    /// The budget text was not a non-negative, finite number.
    #[error("\"{0}\" is not a valid budget, the budget must be zero or more")]
    InvalidBudget(String),

    /// An empty string was used to name a category.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The category is already in the list of categories.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// The column name used to sort expenses does not exist.
    #[error("cannot sort by \"{0}\"")]
    InvalidSortColumn(String),

    /// No file path was given for an export.
    #[error("an export file path is required")]
    EmptyExportPath,

    /// The export path is the workbook backing the expense book.
    #[error("cannot export to {0}, it is the workbook the expenses are saved in")]
    ExportToWorkbook(String),

    /// There are no changes to undo.
    #[error("there is nothing to undo")]
    NothingToUndo,

    /// The workbook exists but is not in the expected shape, e.g. a sheet or
    /// column is missing, or a row could not be read.
    #[error("the workbook is malformed: {0}")]
    MalformedWorkbook(String),

    /// The workbook could not be opened or read.
    #[error("could not read the workbook: {0}")]
    WorkbookReadError(String),

    /// The workbook could not be written.
    #[error("could not write the workbook: {0}")]
    WorkbookWriteError(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the lock on the expense book.
    #[error("could not acquire the expense book lock")]
    LockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Tried to update an expense that does not exist
    #[error("tried to update expense {0}, which is not in the expense table")]
    UpdateMissingExpense(ExpenseId),

    /// Tried to delete an expense that does not exist
    #[error("tried to delete expense {0}, which is not in the expense table")]
    DeleteMissingExpense(ExpenseId),
}

impl From<calamine::XlsxError> for Error {
    fn from(value: calamine::XlsxError) -> Self {
        Error::WorkbookReadError(value.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Error::WorkbookWriteError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::LockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error @ (Error::InvalidDate(_)
            | Error::InvalidAmount(_)
            | Error::NonPositiveAmount(_)
            | Error::InvalidMonth(_)) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid expense".to_owned(),
                    details: capitalize(&error.to_string()),
                },
            ),
            error @ (Error::InvalidBudget(_)
            | Error::EmptyCategoryName
            | Error::DuplicateCategory(_)) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid budget".to_owned(),
                    details: capitalize(&error.to_string()),
                },
            ),
            Error::InvalidSortColumn(column) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not sort expenses".to_owned(),
                    details: format!(
                        "Cannot sort by \"{column}\". Choose one of Date, Category, Amount or Description."
                    ),
                },
            ),
            Error::EmptyExportPath => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Choose a file path to export to".to_owned(),
                },
            ),
            Error::ExportToWorkbook(path) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Choose a different file path".to_owned(),
                    details: format!(
                        "{path} is the workbook the expenses are saved in. \
                        Exporting there would overwrite the budgets."
                    ),
                },
            ),
            Error::NothingToUndo => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Nothing to undo".to_owned(),
                },
            ),
            Error::UpdateMissingExpense(_) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update expense".to_owned(),
                    details: "The expense could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingExpense(_) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete expense".to_owned(),
                    details: "The expense could not be found. \
                    Try refreshing the page to see if the expense has already been deleted."
                        .to_owned(),
                },
            ),
            Error::WorkbookWriteError(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Could not save changes".to_owned(),
                    details: format!(
                        "The workbook could not be written, so the change was not applied: {reason}"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
