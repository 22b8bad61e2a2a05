//! Field validation and monthly aggregation of expenses.
//!
//! [validate] answers whether raw form text could become an expense, while
//! [parse_expense] does the same parsing but keeps the reason for a failure
//! so the UI can point at the offending field.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use time::{
    Date, Month,
    format_description::BorrowedFormatItem,
    macros::{date, format_description},
};

use crate::{Error, expense::ExpenseRecord};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// The earliest date a workbook date cell can hold.
pub const FIRST_STORABLE_DATE: Date = date!(1900 - 01 - 01);
/// The latest date a workbook date cell can hold.
pub const LAST_STORABLE_DATE: Date = date!(9999 - 12 - 31);

/// Returns `true` if `date_text` is a real calendar date written as
/// `YYYY-MM-DD`, no earlier than [FIRST_STORABLE_DATE], and `amount_text` is
/// a finite number.
///
/// The category and description are accepted as-is, empty strings included.
/// A zero or negative amount passes; positivity is enforced when the expense
/// is added to the [crate::ExpenseBook].
pub fn validate(date_text: &str, _category: &str, amount_text: &str, _description: &str) -> bool {
    parse_date(date_text).is_ok() && parse_amount(amount_text).is_ok()
}

/// Parse raw form text into an expense record.
///
/// # Errors
/// Returns [Error::InvalidDate] or [Error::InvalidAmount] for the first field
/// that does not parse.
pub fn parse_expense(
    date_text: &str,
    category: &str,
    amount_text: &str,
    description: &str,
) -> Result<ExpenseRecord, Error> {
    Ok(ExpenseRecord {
        date: parse_date(date_text)?,
        category: category.to_owned(),
        amount: parse_amount(amount_text)?,
        description: description.to_owned(),
    })
}

/// Parse a strict, zero padded `YYYY-MM-DD` date.
///
/// # Errors
/// Returns [Error::InvalidDate] if the text has any other shape, names a
/// day that does not exist, e.g. `2023-02-29`, or a day a workbook cannot hold.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    if !matches_digit_pattern(text, "dddd-dd-dd") {
        return Err(Error::InvalidDate(text.to_owned()));
    }

    let date = Date::parse(text, DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_owned()))?;
    check_storable_date(date).map_err(|_| Error::InvalidDate(text.to_owned()))?;

    Ok(date)
}

/// Check that `date` falls between [FIRST_STORABLE_DATE] and [LAST_STORABLE_DATE].
///
/// # Errors
/// Returns [Error::InvalidDate] for any other date.
pub fn check_storable_date(date: Date) -> Result<(), Error> {
    if (FIRST_STORABLE_DATE..=LAST_STORABLE_DATE).contains(&date) {
        Ok(())
    } else {
        Err(Error::InvalidDate(date.to_string()))
    }
}

/// Parse an amount as a finite number. Surrounding whitespace is ignored.
///
/// # Errors
/// Returns [Error::InvalidAmount] if the text is not a number, or is infinite or NaN.
pub fn parse_amount(text: &str) -> Result<f64, Error> {
    match text.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(Error::InvalidAmount(text.to_owned())),
    }
}

/// Checks `text` against `pattern`, where `d` matches an ASCII digit and any
/// other character matches itself.
fn matches_digit_pattern(text: &str, pattern: &str) -> bool {
    text.len() == pattern.len()
        && text.bytes().zip(pattern.bytes()).all(|(c, p)| match p {
            b'd' => c.is_ascii_digit(),
            p => c == p,
        })
}

/// A calendar month of a specific year, e.g. 2024-03.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// The month that `date` falls in.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }

    /// Whether `date` falls within this month.
    pub fn contains(&self, date: Date) -> bool {
        *self == Self::of(date)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth(text.to_owned());

        if !matches_digit_pattern(text, "dddd-dd") {
            return Err(invalid());
        }

        let year = text[..4].parse::<i32>().map_err(|_| invalid())?;
        let month = text[5..].parse::<u8>().map_err(|_| invalid())?;
        Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Sums the amounts of the expenses dated within `month`, grouped by category.
///
/// Categories without any expense in `month` are absent from the result,
/// they are not reported as zero.
pub fn monthly_totals<'a>(
    expenses: impl IntoIterator<Item = &'a ExpenseRecord>,
    month: YearMonth,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();

    for expense in expenses
        .into_iter()
        .filter(|expense| month.contains(expense.date))
    {
        *totals.entry(expense.category.clone()).or_insert(0.0) += expense.amount;
    }

    totals
}


#[cfg(test)]
mod year_month_tests {
    use std::str::FromStr;

    use time::macros::date;

    use crate::Error;

    use super::YearMonth;

    #[test]
    fn parses_and_displays() {
        let month = YearMonth::from_str("2024-03").unwrap();

        assert_eq!(month.to_string(), "2024-03");
        assert_eq!(month, YearMonth::of(date!(2024 - 03 - 31)));
    }

    #[test]
    fn rejects_invalid_months() {
        for text in ["2024-00", "2024-13", "2024-3", "24-03", "2024-03-01", ""] {
            assert_eq!(
                YearMonth::from_str(text),
                Err(Error::InvalidMonth(text.to_owned()))
            );
        }
    }

    #[test]
    fn contains_only_dates_of_same_year_and_month() {
        let month = YearMonth::from_str("2024-03").unwrap();

        assert!(month.contains(date!(2024 - 03 - 01)));
        assert!(month.contains(date!(2024 - 03 - 31)));
        assert!(!month.contains(date!(2024 - 04 - 01)));
        assert!(!month.contains(date!(2023 - 03 - 15)));
    }
}

#[cfg(test)]
mod monthly_totals_tests {
    use std::{collections::BTreeMap, str::FromStr};

    use time::macros::date;

    use crate::expense::ExpenseRecord;

    use super::{YearMonth, monthly_totals};

    fn record(date: time::Date, category: &str, amount: f64) -> ExpenseRecord {
        ExpenseRecord {
            date,
            category: category.to_owned(),
            amount,
            description: String::new(),
        }
    }

    #[test]
    fn empty_table_has_no_totals() {
        let expenses: Vec<ExpenseRecord> = Vec::new();

        let totals = monthly_totals(&expenses, YearMonth::from_str("2024-03").unwrap());

        assert!(totals.is_empty());
    }

    #[test]
    fn single_expense() {
        let expenses = vec![record(date!(2024 - 03 - 01), "Food", 12.50)];

        let totals = monthly_totals(&expenses, YearMonth::from_str("2024-03").unwrap());

        assert_eq!(totals, BTreeMap::from([("Food".to_owned(), 12.50)]));
    }

    #[test]
    fn sums_by_category_within_month_only() {
        let expenses = vec![
            record(date!(2024 - 02 - 29), "Food", 100.0),
            record(date!(2024 - 03 - 01), "Food", 10.0),
            record(date!(2024 - 03 - 15), "Transport", 2.5),
            record(date!(2024 - 03 - 31), "Food", 5.0),
            record(date!(2024 - 04 - 01), "Transport", 40.0),
            record(date!(2023 - 03 - 10), "Shopping", 7.0),
        ];

        let totals = monthly_totals(&expenses, YearMonth::from_str("2024-03").unwrap());

        assert_eq!(
            totals,
            BTreeMap::from([("Food".to_owned(), 15.0), ("Transport".to_owned(), 2.5)])
        );
        assert!(!totals.contains_key("Shopping"));
    }

    #[test]
    fn categories_are_case_sensitive() {
        let expenses = vec![
            record(date!(2024 - 03 - 01), "food", 1.0),
            record(date!(2024 - 03 - 02), "Food", 2.0),
        ];

        let totals = monthly_totals(&expenses, YearMonth::from_str("2024-03").unwrap());

        assert_eq!(totals.len(), 2);
    }
}
