//! The expense form shared by the create and edit pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    aggregation::parse_expense,
    expense::ExpenseRecord,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The raw form data for an expense.
///
/// Fields are kept as text so that invalid input can be shown back to the
/// user alongside the error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    pub date: String,
    #[serde(default)]
    pub category: String,
    pub amount: String,
    #[serde(default)]
    pub description: String,
}

impl ExpenseForm {
    /// Fill the form with an existing expense.
    pub fn from_record(record: &ExpenseRecord) -> Self {
        Self {
            date: record.date.to_string(),
            category: record.category.clone(),
            amount: record.amount.to_string(),
            description: record.description.clone(),
        }
    }

    /// An empty form with the date set to `today`.
    pub fn with_date(today: Date) -> Self {
        Self {
            date: today.to_string(),
            ..Default::default()
        }
    }

    /// Parse the form into an expense record.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] or [Error::InvalidAmount] if those fields
    /// do not parse.
    pub fn parse(&self) -> Result<ExpenseRecord, Error> {
        parse_expense(&self.date, &self.category, &self.amount, &self.description)
    }
}

/// Where the form sends its data.
pub enum FormAction<'a> {
    Post(&'a str),
    Put(&'a str),
}

/// Render the expense form.
///
/// `categories` are offered as suggestions for the free-text category field.
pub fn expense_form_view(
    action: FormAction<'_>,
    values: &ExpenseForm,
    categories: &[String],
    submit_text: &str,
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put) = match action {
        FormAction::Post(endpoint) => (Some(endpoint), None),
        FormAction::Put(endpoint) => (None, Some(endpoint)),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="date"
                    value=(values.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    name="category"
                    id="category"
                    type="text"
                    list="categories"
                    placeholder="Category"
                    value=(values.category)
                    class=(FORM_TEXT_INPUT_STYLE);

                datalist id="categories"
                {
                    @for category in categories {
                        option value=(category) {}
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.01"
                        value=(values.amount)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="Description"
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}
