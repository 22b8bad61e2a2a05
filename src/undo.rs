//! Bounded history of expense table snapshots and the undo endpoint.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{AppState, Error, endpoints, expense::Expense, ledger::ExpenseBook};

/// The number of snapshots kept when no depth is configured.
pub const DEFAULT_UNDO_DEPTH: usize = 50;

/// Snapshots of the expense table taken before each change, newest last.
///
/// Holds at most `max_depth` snapshots. Pushing onto a full history drops the
/// oldest snapshot.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    snapshots: VecDeque<Vec<Expense>>,
    max_depth: usize,
}

impl UndoHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(max_depth.min(DEFAULT_UNDO_DEPTH)),
            max_depth,
        }
    }

    pub fn push(&mut self, snapshot: Vec<Expense>) {
        if self.max_depth == 0 {
            return;
        }

        while self.snapshots.len() >= self.max_depth {
            self.snapshots.pop_front();
        }

        self.snapshots.push_back(snapshot);
    }

    /// Take the most recent snapshot.
    pub fn pop(&mut self) -> Option<Vec<Expense>> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

/// The state needed for undoing a change.
#[derive(Debug, Clone)]
pub struct UndoEndpointState {
    pub expense_book: Arc<Mutex<ExpenseBook>>,
}

impl FromRef<AppState> for UndoEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_book: state.expense_book.clone(),
        }
    }
}

/// Revert the last add, edit, delete or sort and reload the expenses page.
pub async fn undo_endpoint(State(state): State<UndoEndpointState>) -> Response {
    let mut expense_book = match state.expense_book.lock() {
        Ok(expense_book) => expense_book,
        Err(error) => {
            tracing::error!("could not acquire expense book lock: {error}");
            return Error::LockError.into_alert_response();
        }
    };

    match expense_book.undo() {
        Ok(()) => (
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::NothingToUndo) => Error::NothingToUndo.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while undoing a change: {error}");
            error.into_alert_response()
        }
    }
}
