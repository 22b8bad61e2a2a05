//! Page and endpoint for exporting the expense table to a separate workbook.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    ledger::ExpenseBook,
    navigation::NavBar,
};

/// The state needed for exporting expenses.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportForm {
    /// Where to write the workbook. `.xlsx` is added if there is no extension.
    pub path: String,
}

/// Render the export page.
pub async fn get_export_page() -> Response {
    let nav_bar = NavBar::new(endpoints::EXPORT_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Export Expenses" }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Write every expense to a new workbook with a single Expenses sheet. "
                    "Budgets are not included."
                }

                (export_form_view())
            }
        }
    );

    base("Export", &[], &content).into_response()
}

fn export_form_view() -> Markup {
    html!(
        form
            hx-post=(endpoints::EXPORT_API)
            hx-target="#alert-container"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            class="space-y-4"
        {
            div
            {
                label for="path" class=(FORM_LABEL_STYLE) { "File path" }

                input
                    type="text"
                    id="path"
                    name="path"
                    placeholder="exports/expenses.xlsx"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Export" }
        }
    )
}

/// Export the expense table to the submitted path and show the result as an alert.
pub async fn export_endpoint(
    State(state): State<ExportState>,
    Form(form): Form<ExportForm>,
) -> Response {
    let expense_book = match state.expense_book.lock() {
        Ok(expense_book) => expense_book,
        Err(error) => {
            tracing::error!("could not acquire expense book lock: {error}");
            return Error::LockError.into_alert_response();
        }
    };

    match expense_book.export(&form.path) {
        Ok(path) => {
            let count = expense_book.expenses().len();
            tracing::info!("Exported {count} expenses to {}", path.display());

            Alert::Success {
                message: "Expenses exported".to_owned(),
                details: format!("Wrote {count} expenses to {}", path.display()),
            }
            .into_response()
        }
        Err(error @ (Error::EmptyExportPath | Error::ExportToWorkbook(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not export expenses to {:?}: {error}", form.path);
            error.into_alert_response()
        }
    }
}


#[cfg(test)]
mod export_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use calamine::{Reader, Xlsx, open_workbook};
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        ledger::test_support::{record, temp_expense_book},
        test_utils::{assert_valid_html, parse_html_fragment},
        workbook::EXPENSES_SHEET,
    };

    use super::{ExportForm, ExportState, export_endpoint};

    #[tokio::test]
    async fn exports_to_path_with_xlsx_extension() {
        let (mut book, dir) = temp_expense_book();
        book.add_expense(record(date!(2024 - 03 - 01), "Food", 12.5, "lunch"))
            .unwrap();
        let state = ExportState {
            expense_book: Arc::new(Mutex::new(book)),
        };
        let target = dir.path().join("backup");

        let response = export_endpoint(
            State(state),
            Form(ExportForm {
                path: target.to_string_lossy().into_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let message: String = html
            .select(&Selector::parse("p").unwrap())
            .next()
            .expect("No alert message found")
            .text()
            .collect();
        assert_eq!(message, "Expenses exported");

        let exported = dir.path().join("backup.xlsx");
        let mut workbook: Xlsx<_> = open_workbook(&exported).unwrap();
        assert_eq!(workbook.sheet_names(), vec![EXPENSES_SHEET.to_owned()]);
        let rows = workbook.worksheet_range(EXPENSES_SHEET).unwrap();
        assert_eq!(rows.height(), 2);
    }

    #[tokio::test]
    async fn blank_path_returns_bad_request() {
        let (book, _dir) = temp_expense_book();
        let state = ExportState {
            expense_book: Arc::new(Mutex::new(book)),
        };

        let response = export_endpoint(
            State(state),
            Form(ExportForm {
                path: "   ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_to_own_workbook_returns_bad_request() {
        let (book, dir) = temp_expense_book();
        let state = ExportState {
            expense_book: Arc::new(Mutex::new(book)),
        };
        let workbook_path = dir.path().join("expenses.xlsx");

        let response = export_endpoint(
            State(state),
            Form(ExportForm {
                path: workbook_path.to_string_lossy().into_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let workbook: Xlsx<_> = open_workbook(&workbook_path).unwrap();
        assert_eq!(workbook.sheet_names().len(), 2);
    }
}
