//! A personal expense tracker served as a local web app.
//!
//! Expenses and per-category budgets live in a single `.xlsx` workbook with an
//! `Expenses` sheet and a `Budgets` sheet. The workbook is loaded once at
//! start up into an [ExpenseBook] and rewritten in full after every change.
//!
//! This library provides the web server's routes, which directly serve HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

pub mod aggregation;
mod alert;
mod app_state;
mod budget;
mod dashboard;
mod endpoints;
mod error;
mod expense;
mod export;
mod html;
mod internal_server_error;
mod ledger;
mod logging;
mod navigation;
mod not_found;
mod report;
mod routing;
mod timezone;
mod undo;
mod workbook;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use error::Error;
pub use expense::ExpenseRecord;
pub use ledger::ExpenseBook;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use undo::DEFAULT_UNDO_DEPTH;
pub use workbook::WorkbookStore;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
