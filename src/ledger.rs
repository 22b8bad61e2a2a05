//! The in-memory expense book shared by every page.
//!
//! All changes to expenses and budgets go through [ExpenseBook], which writes
//! the whole workbook after each change. If the write fails, the change is
//! rolled back so the book never drifts from the file on disk.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    Error,
    aggregation::{self, YearMonth},
    budget::{BudgetMap, parse_budget},
    expense::{Expense, ExpenseId, ExpenseRecord, ExpenseTable, SortColumn},
    undo::UndoHistory,
    workbook::{WorkbookStore, export_expenses},
};

/// The categories offered when no budgets have been set.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Food", "Transport", "Shopping", "Others"];

/// The expense table, budgets and undo history, backed by a workbook.
#[derive(Debug)]
pub struct ExpenseBook {
    store: WorkbookStore,
    expenses: ExpenseTable,
    budgets: BudgetMap,
    added_categories: Vec<String>,
    history: UndoHistory,
}

impl ExpenseBook {
    /// Load the expense book from `store`, keeping up to `undo_depth` undo
    /// snapshots.
    ///
    /// # Errors
    /// Returns [Error::WorkbookWriteError] if the workbook was unreadable and
    /// the empty replacement could not be written.
    pub fn open(store: WorkbookStore, undo_depth: usize) -> Result<Self, Error> {
        let (records, budgets) = store.load()?;

        Ok(Self {
            store,
            expenses: ExpenseTable::from_records(records),
            budgets,
            added_categories: Vec::new(),
            history: UndoHistory::new(undo_depth),
        })
    }

    /// The expense table in its current row order.
    pub fn expenses(&self) -> &ExpenseTable {
        &self.expenses
    }

    /// The monthly budget for each category.
    pub fn budgets(&self) -> &BudgetMap {
        &self.budgets
    }

    /// The categories to offer when entering an expense.
    ///
    /// These are the budgeted categories, or [DEFAULT_CATEGORIES] if there
    /// are no budgets, followed by any categories added with
    /// [ExpenseBook::add_category].
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = if self.budgets.is_empty() {
            DEFAULT_CATEGORIES.map(str::to_owned).to_vec()
        } else {
            self.budgets.keys().cloned().collect()
        };

        for category in &self.added_categories {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }

        categories
    }

    /// Whether there is a change to the expense table that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Append an expense to the table and save.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if the workbook cannot hold the date,
    /// [Error::NonPositiveAmount] if the amount is zero or less, or
    /// [Error::WorkbookWriteError] if the workbook could not be saved.
    pub fn add_expense(&mut self, record: ExpenseRecord) -> Result<ExpenseId, Error> {
        check_record(&record)?;

        self.change_expenses(|expenses| Ok(expenses.push(record)))
    }

    /// Replace the expense `id` in place and save.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if the workbook cannot hold the date,
    /// [Error::NonPositiveAmount] if the amount is zero or less,
    /// [Error::UpdateMissingExpense] if there is no such expense, or
    /// [Error::WorkbookWriteError] if the workbook could not be saved.
    pub fn edit_expense(&mut self, id: ExpenseId, record: ExpenseRecord) -> Result<(), Error> {
        check_record(&record)?;

        self.change_expenses(|expenses| {
            if expenses.replace(id, record) {
                Ok(())
            } else {
                Err(Error::UpdateMissingExpense(id))
            }
        })
    }

    /// Remove the expense `id` and save.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingExpense] if there is no such expense, or
    /// [Error::WorkbookWriteError] if the workbook could not be saved.
    pub fn delete_expense(&mut self, id: ExpenseId) -> Result<Expense, Error> {
        self.change_expenses(|expenses| {
            expenses
                .remove(id)
                .ok_or(Error::DeleteMissingExpense(id))
        })
    }

    /// Sort the expense table by `column` and save the new row order.
    ///
    /// # Errors
    /// Returns [Error::WorkbookWriteError] if the workbook could not be saved.
    pub fn sort_expenses(&mut self, column: SortColumn) -> Result<(), Error> {
        self.change_expenses(|expenses| {
            expenses.sort_by(column);
            Ok(())
        })
    }

    /// Restore the expense table to how it was before the last add, edit,
    /// delete or sort, and save.
    ///
    /// # Errors
    /// Returns [Error::NothingToUndo] if the history is empty, or
    /// [Error::WorkbookWriteError] if the workbook could not be saved, in
    /// which case the undo can be retried.
    pub fn undo(&mut self) -> Result<(), Error> {
        let snapshot = self.history.pop().ok_or(Error::NothingToUndo)?;
        let current = self.expenses.restore(snapshot);

        if let Err(error) = self.save() {
            let snapshot = self.expenses.restore(current);
            self.history.push(snapshot);
            return Err(error);
        }

        tracing::info!("Undid last change, {} expenses", self.expenses.len());

        Ok(())
    }

    /// Set the monthly budget for `category` and save.
    ///
    /// The category name is trimmed. Setting a budget for an existing
    /// category overwrites it.
    ///
    /// # Errors
    /// Returns [Error::EmptyCategoryName], [Error::InvalidBudget], or
    /// [Error::WorkbookWriteError] if the workbook could not be saved.
    pub fn set_budget(&mut self, category: &str, budget_text: &str) -> Result<(), Error> {
        let category = category.trim();
        if category.is_empty() {
            return Err(Error::EmptyCategoryName);
        }

        let budget = parse_budget(budget_text)?;
        let previous = self.budgets.insert(category.to_owned(), budget);

        if let Err(error) = self.save() {
            match previous {
                Some(previous) => self.budgets.insert(category.to_owned(), previous),
                None => self.budgets.remove(category),
            };
            return Err(error);
        }

        tracing::info!("Set budget for {category} to {budget}");

        Ok(())
    }

    /// Add a category to the list offered when entering an expense.
    ///
    /// Added categories are not saved until a budget is set for them.
    ///
    /// # Errors
    /// Returns [Error::EmptyCategoryName] if the trimmed name is empty, or
    /// [Error::DuplicateCategory] if it is already in [ExpenseBook::categories].
    pub fn add_category(&mut self, name: &str) -> Result<String, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyCategoryName);
        }

        if self.categories().iter().any(|category| category == name) {
            return Err(Error::DuplicateCategory(name.to_owned()));
        }

        self.added_categories.push(name.to_owned());

        Ok(name.to_owned())
    }

    /// The expenses whose category or description contains `query`, ignoring
    /// case, in table order. An empty query matches every expense.
    pub fn search(&self, query: &str) -> Vec<&Expense> {
        let query = query.trim().to_lowercase();

        self.expenses
            .iter()
            .filter(|expense| {
                query.is_empty()
                    || expense.record.category.to_lowercase().contains(&query)
                    || expense.record.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Total spending per category for `month`.
    pub fn monthly_totals(&self, month: YearMonth) -> BTreeMap<String, f64> {
        aggregation::monthly_totals(self.expenses.records(), month)
    }

    /// Write the expense table to its own workbook at `path_text`.
    ///
    /// A path without an extension is given the `.xlsx` extension.
    ///
    /// # Errors
    /// Returns [Error::EmptyExportPath] if the path is blank,
    /// [Error::ExportToWorkbook] if the path is the book's own workbook, or
    /// [Error::WorkbookWriteError] if the file could not be written.
    pub fn export(&self, path_text: &str) -> Result<PathBuf, Error> {
        let path_text = path_text.trim();
        if path_text.is_empty() {
            return Err(Error::EmptyExportPath);
        }

        let mut path = PathBuf::from(path_text);
        if path.extension().is_none() {
            path.set_extension("xlsx");
        }

        if is_same_file(&path, self.store.path()) {
            return Err(Error::ExportToWorkbook(path.display().to_string()));
        }

        export_expenses(&path, self.expenses.records())?;

        Ok(path)
    }

    /// Apply `change` to the expense table and save, recording an undo
    /// snapshot on success.
    ///
    /// `change` must leave the table untouched when it returns an error.
    fn change_expenses<T>(
        &mut self,
        change: impl FnOnce(&mut ExpenseTable) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let snapshot = self.expenses.snapshot();
        let value = change(&mut self.expenses)?;

        if let Err(error) = self.save() {
            self.expenses.restore(snapshot);
            return Err(error);
        }

        self.history.push(snapshot);

        Ok(value)
    }

    fn save(&self) -> Result<(), Error> {
        self.store
            .save(self.expenses.records(), &self.budgets)
            .inspect_err(|error| tracing::error!("Could not save the workbook: {error}"))
    }
}

fn check_record(record: &ExpenseRecord) -> Result<(), Error> {
    aggregation::check_storable_date(record.date)?;

    if record.amount > 0.0 {
        Ok(())
    } else {
        Err(Error::NonPositiveAmount(record.amount))
    }
}

/// Whether `a` and `b` name the same file, following links when both exist.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
