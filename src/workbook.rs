//! Persists the expense table and budgets to a two-sheet `.xlsx` workbook.
//!
//! The workbook is always read and written in full. Reading fails closed: a
//! missing or malformed workbook is replaced by an empty one.

use std::{
    cmp::Ordering,
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use time::{Date, Duration, macros::date};

use crate::{
    Error,
    aggregation::{check_storable_date, parse_amount, parse_date},
    budget::BudgetMap,
    expense::ExpenseRecord,
};

/// The name of the sheet holding the expense table.
pub const EXPENSES_SHEET: &str = "Expenses";
/// The name of the sheet holding the budget mapping.
pub const BUDGETS_SHEET: &str = "Budgets";

const EXPENSE_COLUMNS: [&str; 4] = ["Date", "Category", "Amount", "Description"];
const BUDGET_COLUMNS: [&str; 2] = ["Category", "Budget"];

/// Day zero of spreadsheet date serials (1900 date system) from 1900-03-01 on.
const SERIAL_EPOCH: Date = date!(1899 - 12 - 30);
/// Day zero for serials before the nonexistent 1900-02-29, which is serial 60.
const EARLY_SERIAL_EPOCH: Date = date!(1899 - 12 - 31);
const FAKE_LEAP_DAY_SERIAL: i64 = 60;

/// The workbook file backing the expense book.
#[derive(Debug, Clone)]
pub struct WorkbookStore {
    path: PathBuf,
}

impl WorkbookStore {
    /// A store for the workbook at `path`. Nothing is read until [WorkbookStore::load].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The location of the workbook file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the expense records and budgets.
    ///
    /// If the workbook is missing, cannot be read, lacks a sheet or required
    /// column, or has a row that is not a valid record, an empty table and
    /// budget mapping are returned and written out as a fresh workbook.
    ///
    /// # Errors
    /// Returns [Error::WorkbookWriteError] if the fresh workbook cannot be written.
    pub fn load(&self) -> Result<(Vec<ExpenseRecord>, BudgetMap), Error> {
        match read_workbook(&self.path) {
            Ok((expenses, budgets)) => {
                tracing::info!(
                    "Loaded {} expenses and {} budgets from {:?}",
                    expenses.len(),
                    budgets.len(),
                    self.path
                );
                Ok((expenses, budgets))
            }
            Err(error) => {
                tracing::warn!(
                    "Could not load {:?}, starting with an empty workbook: {error}",
                    self.path
                );
                let expenses = Vec::new();
                let budgets = BudgetMap::new();
                self.save(&expenses, &budgets)?;

                Ok((expenses, budgets))
            }
        }
    }

    /// Overwrite the workbook with `expenses` and `budgets`.
    ///
    /// The parent directory is created if needed.
    ///
    /// # Errors
    /// Returns [Error::WorkbookWriteError] if the workbook cannot be written.
    pub fn save<'a>(
        &self,
        expenses: impl IntoIterator<Item = &'a ExpenseRecord>,
        budgets: &BudgetMap,
    ) -> Result<(), Error> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(expenses_worksheet(expenses)?);
        workbook.push_worksheet(budgets_worksheet(budgets)?);

        write_workbook(&mut workbook, &self.path)?;
        tracing::debug!("Saved workbook to {:?}", self.path);

        Ok(())
    }
}

/// Write `expenses` to a new workbook at `path` containing only the Expenses sheet.
///
/// # Errors
/// Returns [Error::WorkbookWriteError] if the workbook cannot be written.
pub fn export_expenses<'a>(
    path: &Path,
    expenses: impl IntoIterator<Item = &'a ExpenseRecord>,
) -> Result<(), Error> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(expenses_worksheet(expenses)?);

    write_workbook(&mut workbook, path)?;
    tracing::info!("Exported expenses to {path:?}");

    Ok(())
}

fn write_workbook(workbook: &mut Workbook, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| {
            Error::WorkbookWriteError(format!("could not create directory {parent:?}: {error}"))
        })?;
    }

    workbook.save(path)?;

    Ok(())
}

fn expenses_worksheet<'a>(
    expenses: impl IntoIterator<Item = &'a ExpenseRecord>,
) -> Result<Worksheet, Error> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(EXPENSES_SHEET)?;
    write_header(&mut worksheet, &EXPENSE_COLUMNS)?;

    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (row, expense) in (1..).zip(expenses) {
        worksheet.write_datetime_with_format(row, 0, &excel_date(expense.date)?, &date_format)?;
        worksheet.write_string(row, 1, &expense.category)?;
        worksheet.write_number(row, 2, expense.amount)?;
        worksheet.write_string(row, 3, &expense.description)?;
    }

    Ok(worksheet)
}

fn budgets_worksheet(budgets: &BudgetMap) -> Result<Worksheet, Error> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(BUDGETS_SHEET)?;
    write_header(&mut worksheet, &BUDGET_COLUMNS)?;

    for (row, (category, budget)) in (1..).zip(budgets) {
        worksheet.write_string(row, 0, category)?;
        worksheet.write_number(row, 1, *budget)?;
    }

    Ok(worksheet)
}

fn write_header(worksheet: &mut Worksheet, columns: &[&str]) -> Result<(), Error> {
    for (col, name) in (0..).zip(columns) {
        worksheet.write_string(0, col, *name)?;
    }

    Ok(())
}

fn excel_date(date: Date) -> Result<ExcelDateTime, Error> {
    let year = u16::try_from(date.year()).map_err(|_| {
        Error::WorkbookWriteError(format!("the year of {date} cannot be stored in a workbook"))
    })?;

    Ok(ExcelDateTime::from_ymd(year, u8::from(date.month()), date.day())?)
}

fn read_workbook(path: &Path) -> Result<(Vec<ExpenseRecord>, BudgetMap), Error> {
    let mut workbook: Xlsx<BufReader<File>> = open_workbook(path)?;

    let expenses = workbook.worksheet_range(EXPENSES_SHEET)?;
    let expenses = read_expenses(&expenses)?;

    let budgets = workbook.worksheet_range(BUDGETS_SHEET)?;
    let budgets = read_budgets(&budgets)?;

    Ok((expenses, budgets))
}

fn read_expenses(range: &Range<Data>) -> Result<Vec<ExpenseRecord>, Error> {
    let [date_col, category_col, amount_col, description_col] =
        column_indices(range, EXPENSES_SHEET, EXPENSE_COLUMNS)?;

    data_rows(range)
        .enumerate()
        .map(|(index, row)| {
            let row_error =
                |reason: String| Error::MalformedWorkbook(format!("{EXPENSES_SHEET} row {}: {reason}", index + 2));

            Ok(ExpenseRecord {
                date: cell_date(row.get(date_col)).map_err(row_error)?,
                category: cell_text(row.get(category_col)),
                amount: cell_number(row.get(amount_col)).map_err(row_error)?,
                description: cell_text(row.get(description_col)),
            })
        })
        .collect()
}

fn read_budgets(range: &Range<Data>) -> Result<BudgetMap, Error> {
    let [category_col, budget_col] = column_indices(range, BUDGETS_SHEET, BUDGET_COLUMNS)?;

    data_rows(range)
        .enumerate()
        .map(|(index, row)| {
            let row_error =
                |reason: String| Error::MalformedWorkbook(format!("{BUDGETS_SHEET} row {}: {reason}", index + 2));

            let budget = cell_number(row.get(budget_col)).map_err(row_error)?;
            if budget < 0.0 {
                return Err(row_error(format!("negative budget {budget}")));
            }

            Ok((cell_text(row.get(category_col)), budget))
        })
        .collect()
}

/// Find the position of each of `columns` in the header row.
fn column_indices<const N: usize>(
    range: &Range<Data>,
    sheet: &str,
    columns: [&str; N],
) -> Result<[usize; N], Error> {
    let header = range
        .rows()
        .next()
        .ok_or_else(|| Error::MalformedWorkbook(format!("the sheet {sheet} is empty")))?;

    let mut indices = [0; N];

    for (index, column) in indices.iter_mut().zip(columns) {
        *index = header
            .iter()
            .position(|cell| matches!(cell, Data::String(name) if name.trim() == column))
            .ok_or_else(|| {
                Error::MalformedWorkbook(format!("the sheet {sheet} has no {column} column"))
            })?;
    }

    Ok(indices)
}

/// The rows below the header, skipping rows where every cell is empty.
fn data_rows(range: &Range<Data>) -> impl Iterator<Item = &[Data]> {
    range
        .rows()
        .skip(1)
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
}

fn cell_date(cell: Option<&Data>) -> Result<Date, String> {
    let date = match cell {
        Some(Data::DateTime(date_time)) => date_from_serial(date_time.as_f64()),
        Some(Data::Float(serial)) => date_from_serial(*serial),
        Some(Data::Int(serial)) => date_from_serial(*serial as f64),
        // Dates written as text may carry a time part, e.g. "2024-03-01 00:00:00".
        Some(Data::DateTimeIso(text) | Data::String(text)) => text
            .get(..10)
            .and_then(|date_text| parse_date(date_text).ok()),
        _ => None,
    };

    date
        .filter(|date| check_storable_date(*date).is_ok())
        .ok_or_else(|| format!("{cell:?} is not a date"))
}

fn date_from_serial(serial: f64) -> Option<Date> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }

    let days = serial.floor() as i64;
    let epoch = match days.cmp(&FAKE_LEAP_DAY_SERIAL) {
        Ordering::Less => EARLY_SERIAL_EPOCH,
        Ordering::Equal => return None,
        Ordering::Greater => SERIAL_EPOCH,
    };

    epoch.checked_add(Duration::days(days))
}

fn cell_number(cell: Option<&Data>) -> Result<f64, String> {
    let number = match cell {
        Some(Data::Float(number)) => Some(*number),
        Some(Data::Int(number)) => Some(*number as f64),
        Some(Data::String(text)) => parse_amount(text).ok(),
        _ => None,
    };

    number
        .filter(|number| number.is_finite())
        .ok_or_else(|| format!("{cell:?} is not a number"))
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(text)) => text.clone(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::{Workbook, Worksheet};
    use tempfile::tempdir;
    use time::macros::date;

    use crate::{budget::BudgetMap, expense::ExpenseRecord};

    use super::{
        BUDGETS_SHEET, EXPENSES_SHEET, WorkbookStore, date_from_serial, export_expenses,
        read_workbook,
    };

    fn record(date: time::Date, category: &str, amount: f64, description: &str) -> ExpenseRecord {
        ExpenseRecord {
            date,
            category: category.to_owned(),
            amount,
            description: description.to_owned(),
        }
    }

    fn sample_state() -> (Vec<ExpenseRecord>, BudgetMap) {
        let expenses = vec![
            record(date!(2024 - 03 - 01), "Food", 12.5, "lunch"),
            record(date!(2024 - 02 - 29), "Transport", 2.25, ""),
            record(date!(2023 - 12 - 31), "", 100.0, "no category"),
        ];
        let budgets = BudgetMap::from([("Food".to_owned(), 300.0), ("Transport".to_owned(), 0.0)]);

        (expenses, budgets)
    }

    #[test]
    fn load_missing_file_returns_empty_state_and_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("expenses.xlsx");
        let store = WorkbookStore::new(&path);

        let (expenses, budgets) = store.load().unwrap();

        assert!(expenses.is_empty());
        assert!(budgets.is_empty());
        assert!(path.is_file(), "want a fresh workbook at {path:?}");

        let (expenses, budgets) = read_workbook(&path).expect("fresh workbook should be valid");
        assert!(expenses.is_empty());
        assert!(budgets.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().join("expenses.xlsx"));
        let (expenses, budgets) = sample_state();

        store.save(&expenses, &budgets).unwrap();
        let got = store.load().unwrap();

        assert_eq!(got, (expenses, budgets));
    }

    #[test]
    fn save_then_load_round_trips_dates_around_1900_leap_day() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().join("expenses.xlsx"));
        let expenses = vec![
            record(date!(1900 - 01 - 01), "Food", 1.0, "first"),
            record(date!(1900 - 01 - 15), "Food", 2.0, ""),
            record(date!(1900 - 02 - 28), "Food", 3.0, ""),
            record(date!(1900 - 03 - 01), "Food", 4.0, ""),
            record(date!(9999 - 12 - 31), "Food", 5.0, "last"),
        ];

        store.save(&expenses, &BudgetMap::new()).unwrap();
        let (got, _) = store.load().unwrap();

        assert_eq!(got, expenses);
    }

    #[test]
    fn serials_skip_the_1900_leap_day() {
        assert_eq!(date_from_serial(1.0), Some(date!(1900 - 01 - 01)));
        assert_eq!(date_from_serial(59.0), Some(date!(1900 - 02 - 28)));
        assert_eq!(date_from_serial(60.0), None);
        assert_eq!(date_from_serial(61.0), Some(date!(1900 - 03 - 01)));
        assert_eq!(date_from_serial(45352.5), Some(date!(2024 - 03 - 01)));
        assert_eq!(date_from_serial(0.0), None);
    }

    #[test]
    fn saving_loaded_state_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().join("expenses.xlsx"));
        let (expenses, budgets) = sample_state();
        store.save(&expenses, &budgets).unwrap();

        let first = store.load().unwrap();
        store.save(&first.0, &first.1).unwrap();
        let second = store.load().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn load_garbage_file_resets_to_empty_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.xlsx");
        std::fs::write(&path, "not a workbook").unwrap();
        let store = WorkbookStore::new(&path);

        let (expenses, budgets) = store.load().unwrap();

        assert!(expenses.is_empty());
        assert!(budgets.is_empty());
        assert!(read_workbook(&path).is_ok(), "want the file to be repaired");
    }

    #[test]
    fn load_with_missing_column_resets_to_empty_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.xlsx");

        let mut expenses_sheet = Worksheet::new();
        expenses_sheet.set_name(EXPENSES_SHEET).unwrap();
        expenses_sheet.write_string(0, 0, "Date").unwrap();
        expenses_sheet.write_string(0, 1, "Category").unwrap();
        expenses_sheet.write_string(0, 2, "Amount").unwrap();
        expenses_sheet.write_string(1, 0, "2024-03-01").unwrap();
        expenses_sheet.write_string(1, 1, "Food").unwrap();
        expenses_sheet.write_number(1, 2, 3.0).unwrap();
        let mut budgets_sheet = Worksheet::new();
        budgets_sheet.set_name(BUDGETS_SHEET).unwrap();
        budgets_sheet.write_string(0, 0, "Category").unwrap();
        budgets_sheet.write_string(0, 1, "Budget").unwrap();
        let mut workbook = Workbook::new();
        workbook.push_worksheet(expenses_sheet);
        workbook.push_worksheet(budgets_sheet);
        workbook.save(&path).unwrap();

        let (expenses, budgets) = WorkbookStore::new(&path).load().unwrap();

        assert!(expenses.is_empty());
        assert!(budgets.is_empty());
    }

    /// Write a workbook with both sheets, where `fill` adds rows under the headers.
    fn write_workbook_with_rows(
        path: &std::path::Path,
        fill: impl FnOnce(&mut Worksheet, &mut Worksheet),
    ) {
        let mut expenses_sheet = Worksheet::new();
        expenses_sheet.set_name(EXPENSES_SHEET).unwrap();
        for (col, name) in ["Date", "Category", "Amount", "Description"]
            .into_iter()
            .enumerate()
        {
            expenses_sheet.write_string(0, col as u16, name).unwrap();
        }
        let mut budgets_sheet = Worksheet::new();
        budgets_sheet.set_name(BUDGETS_SHEET).unwrap();
        budgets_sheet.write_string(0, 0, "Category").unwrap();
        budgets_sheet.write_string(0, 1, "Budget").unwrap();

        fill(&mut expenses_sheet, &mut budgets_sheet);

        let mut workbook = Workbook::new();
        workbook.push_worksheet(expenses_sheet);
        workbook.push_worksheet(budgets_sheet);
        workbook.save(path).unwrap();
    }

    #[test]
    fn load_with_non_date_cell_resets_to_empty_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.xlsx");
        write_workbook_with_rows(&path, |expenses, budgets| {
            expenses.write_string(1, 0, "2024-03-01").unwrap();
            expenses.write_string(1, 1, "Food").unwrap();
            expenses.write_number(1, 2, 12.5).unwrap();
            expenses.write_string(2, 0, "yesterday").unwrap();
            expenses.write_string(2, 1, "Food").unwrap();
            expenses.write_number(2, 2, 3.0).unwrap();
            budgets.write_string(1, 0, "Food").unwrap();
            budgets.write_number(1, 1, 100.0).unwrap();
        });

        let (expenses, budgets) = WorkbookStore::new(&path).load().unwrap();

        assert!(expenses.is_empty());
        assert!(budgets.is_empty());
        let repaired = read_workbook(&path).expect("want the file to be repaired");
        assert_eq!(repaired, (Vec::new(), BudgetMap::new()));
    }

    #[test]
    fn load_with_negative_budget_resets_to_empty_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.xlsx");
        write_workbook_with_rows(&path, |expenses, budgets| {
            expenses.write_string(1, 0, "2024-03-01").unwrap();
            expenses.write_string(1, 1, "Food").unwrap();
            expenses.write_number(1, 2, 12.5).unwrap();
            budgets.write_string(1, 0, "Food").unwrap();
            budgets.write_number(1, 1, -5.0).unwrap();
        });

        let (expenses, budgets) = WorkbookStore::new(&path).load().unwrap();

        assert!(expenses.is_empty());
        assert!(budgets.is_empty());
        let repaired = read_workbook(&path).expect("want the file to be repaired");
        assert_eq!(repaired, (Vec::new(), BudgetMap::new()));
    }

    #[test]
    fn load_with_missing_budgets_sheet_resets_to_empty_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.xlsx");
        let (expenses, _) = sample_state();
        export_expenses(&path, &expenses).unwrap();

        let (expenses, budgets) = WorkbookStore::new(&path).load().unwrap();

        assert!(expenses.is_empty());
        assert!(budgets.is_empty());
    }

    #[test]
    fn reads_text_dates_numeric_text_and_reordered_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expenses.xlsx");

        let mut expenses_sheet = Worksheet::new();
        expenses_sheet.set_name(EXPENSES_SHEET).unwrap();
        for (col, name) in ["Description", "Amount", "Category", "Date", "Notes"]
            .into_iter()
            .enumerate()
        {
            expenses_sheet.write_string(0, col as u16, name).unwrap();
        }
        expenses_sheet.write_string(1, 0, "lunch").unwrap();
        expenses_sheet.write_string(1, 1, "12.5").unwrap();
        expenses_sheet.write_string(1, 2, "Food").unwrap();
        expenses_sheet.write_string(1, 3, "2024-03-01 00:00:00").unwrap();
        expenses_sheet.write_string(1, 4, "ignored").unwrap();
        let mut budgets_sheet = Worksheet::new();
        budgets_sheet.set_name(BUDGETS_SHEET).unwrap();
        budgets_sheet.write_string(0, 0, "Category").unwrap();
        budgets_sheet.write_string(0, 1, "Budget").unwrap();
        budgets_sheet.write_string(1, 0, "Food").unwrap();
        budgets_sheet.write_number(1, 1, 250).unwrap();
        let mut workbook = Workbook::new();
        workbook.push_worksheet(expenses_sheet);
        workbook.push_worksheet(budgets_sheet);
        workbook.save(&path).unwrap();

        let (expenses, budgets) = read_workbook(&path).unwrap();

        assert_eq!(
            expenses,
            vec![record(date!(2024 - 03 - 01), "Food", 12.5, "lunch")]
        );
        assert_eq!(budgets, BudgetMap::from([("Food".to_owned(), 250.0)]));
    }

    #[test]
    fn export_writes_only_expenses_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        let (expenses, _) = sample_state();

        export_expenses(&path, &expenses).unwrap();

        let mut workbook: calamine::Xlsx<_> = calamine::open_workbook(&path).unwrap();
        use calamine::Reader;
        assert_eq!(workbook.sheet_names(), vec![EXPENSES_SHEET.to_owned()]);
        let range = workbook.worksheet_range(EXPENSES_SHEET).unwrap();
        assert_eq!(super::read_expenses(&range).unwrap(), expenses);
    }
}
