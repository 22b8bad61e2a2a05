//! Core expense domain types.

use std::{fmt::Display, str::FromStr};

use time::Date;

use crate::Error;

/// Identifier for an expense, unique within a running process.
///
/// Identifiers are assigned when a row is loaded or inserted and are never
/// reused, so they stay valid across edits, deletes, sorts and undos. They are
/// not written to the workbook.
pub type ExpenseId = u64;

/// The persisted fields of an expense: one row of the Expenses sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    /// When the money was spent.
    pub date: Date,
    /// A free-form label used to group expenses, e.g. "Food".
    pub category: String,
    /// How much was spent.
    pub amount: f64,
    /// What the money was spent on.
    pub description: String,
}

/// An expense in the expense table.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub record: ExpenseRecord,
}

/// The ordered expense table.
///
/// Rows keep their insertion order unless [ExpenseTable::sort_by] is called.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseTable {
    rows: Vec<Expense>,
    next_id: ExpenseId,
}

impl ExpenseTable {
    /// Create a table from records in row order, assigning IDs from 1.
    pub fn from_records(records: Vec<ExpenseRecord>) -> Self {
        let mut table = Self {
            rows: Vec::with_capacity(records.len()),
            next_id: 1,
        };

        for record in records {
            table.push(record);
        }

        table
    }

    /// Append `record` to the end of the table and return its new ID.
    pub fn push(&mut self, record: ExpenseRecord) -> ExpenseId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.rows.push(Expense { id, record });

        id
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.rows.iter().find(|expense| expense.id == id)
    }

    /// Replace the record of the expense `id`, keeping its position.
    ///
    /// Returns `false` if there is no such expense.
    pub fn replace(&mut self, id: ExpenseId, record: ExpenseRecord) -> bool {
        match self.rows.iter_mut().find(|expense| expense.id == id) {
            Some(expense) => {
                expense.record = record;
                true
            }
            None => false,
        }
    }

    /// Remove the expense `id`, returning it if it existed.
    pub fn remove(&mut self, id: ExpenseId) -> Option<Expense> {
        let position = self.rows.iter().position(|expense| expense.id == id)?;

        Some(self.rows.remove(position))
    }

    /// Stable sort of the rows in ascending order of `column`.
    pub fn sort_by(&mut self, column: SortColumn) {
        match column {
            SortColumn::Date => self.rows.sort_by_key(|expense| expense.record.date),
            SortColumn::Category => self
                .rows
                .sort_by(|a, b| a.record.category.cmp(&b.record.category)),
            SortColumn::Amount => self
                .rows
                .sort_by(|a, b| a.record.amount.total_cmp(&b.record.amount)),
            SortColumn::Description => self
                .rows
                .sort_by(|a, b| a.record.description.cmp(&b.record.description)),
        }
    }

    /// A copy of the rows, for restoring with [ExpenseTable::restore].
    pub fn snapshot(&self) -> Vec<Expense> {
        self.rows.clone()
    }

    /// Replace all rows with a snapshot taken earlier.
    ///
    /// IDs handed out since the snapshot are not reused.
    pub fn restore(&mut self, rows: Vec<Expense>) -> Vec<Expense> {
        std::mem::replace(&mut self.rows, rows)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Expense> {
        self.rows.iter()
    }

    /// The records in row order, without their IDs.
    pub fn records(&self) -> impl Iterator<Item = &ExpenseRecord> {
        self.rows.iter().map(|expense| &expense.record)
    }

    /// The last `count` rows in table order.
    pub fn tail(&self, count: usize) -> &[Expense] {
        &self.rows[self.rows.len().saturating_sub(count)..]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A column of the expense table that rows can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Date,
    Category,
    Amount,
    Description,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::Date,
        SortColumn::Category,
        SortColumn::Amount,
        SortColumn::Description,
    ];
}

impl FromStr for SortColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortColumn::Date),
            "category" => Ok(SortColumn::Category),
            "amount" => Ok(SortColumn::Amount),
            "description" => Ok(SortColumn::Description),
            _ => Err(Error::InvalidSortColumn(s.to_owned())),
        }
    }
}

impl Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortColumn::Date => "Date",
            SortColumn::Category => "Category",
            SortColumn::Amount => "Amount",
            SortColumn::Description => "Description",
        };

        write!(f, "{name}")
    }
}

#[cfg(test)]
mod expense_table_tests {
    use std::str::FromStr;

    use time::macros::date;

    use crate::Error;

    use super::{ExpenseRecord, ExpenseTable, SortColumn};

    fn record(date: time::Date, category: &str, amount: f64, description: &str) -> ExpenseRecord {
        ExpenseRecord {
            date,
            category: category.to_owned(),
            amount,
            description: description.to_owned(),
        }
    }

    fn sample_table() -> ExpenseTable {
        ExpenseTable::from_records(vec![
            record(date!(2024 - 03 - 03), "Transport", 2.5, "bus"),
            record(date!(2024 - 03 - 01), "Food", 12.5, "lunch"),
            record(date!(2024 - 03 - 02), "Food", 30.0, "groceries"),
        ])
    }

    #[test]
    fn from_records_assigns_ids_in_row_order() {
        let table = sample_table();

        let ids: Vec<_> = table.iter().map(|expense| expense.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let mut table = sample_table();

        table.remove(3).expect("expense 3 should exist");
        let id = table.push(record(date!(2024 - 03 - 04), "Food", 1.0, ""));

        assert_eq!(id, 4);
    }

    #[test]
    fn ids_are_not_reused_after_restore() {
        let mut table = sample_table();
        let snapshot = table.snapshot();

        table.push(record(date!(2024 - 03 - 04), "Food", 1.0, ""));
        table.restore(snapshot);
        let id = table.push(record(date!(2024 - 03 - 05), "Food", 1.0, ""));

        assert_eq!(id, 5);
    }

    #[test]
    fn default_table_starts_ids_at_one() {
        let mut table = ExpenseTable::default();

        assert_eq!(table.push(record(date!(2024 - 03 - 04), "Food", 1.0, "")), 1);
    }

    #[test]
    fn replace_keeps_position() {
        let mut table = sample_table();
        let new_record = record(date!(2024 - 01 - 01), "Rent", 900.0, "January");

        assert!(table.replace(2, new_record.clone()));

        let rows: Vec<_> = table.iter().collect();
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[1].record, new_record);
    }

    #[test]
    fn replace_missing_returns_false() {
        let mut table = sample_table();

        assert!(!table.replace(42, record(date!(2024 - 01 - 01), "Rent", 900.0, "")));
    }

    #[test]
    fn sort_by_amount_then_date() {
        let mut table = sample_table();

        table.sort_by(SortColumn::Amount);
        let ids: Vec<_> = table.iter().map(|expense| expense.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        table.sort_by(SortColumn::Date);
        let ids: Vec<_> = table.iter().map(|expense| expense.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn sort_is_stable() {
        let mut table = sample_table();

        table.sort_by(SortColumn::Category);

        let ids: Vec<_> = table.iter().map(|expense| expense.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn tail_returns_last_rows() {
        let table = sample_table();

        let ids: Vec<_> = table.tail(2).iter().map(|expense| expense.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(table.tail(10).len(), 3);
    }

    #[test]
    fn sort_column_parses_case_insensitively() {
        assert_eq!(SortColumn::from_str("amount"), Ok(SortColumn::Amount));
        assert_eq!(SortColumn::from_str("Description"), Ok(SortColumn::Description));
        assert_eq!(
            SortColumn::from_str("id"),
            Err(Error::InvalidSortColumn("id".to_owned()))
        );
    }
}
