//! Ledger is a bookkeeping backend for managing personal finances.
//!
//! This library provides a JSON REST API over accounts, categories, payment
//! methods, expense types, recurrence types, transactions, goals and
//! installment plans, plus reports (dashboard totals, monthly balance and
//! per-dimension summaries) computed by a pure aggregation engine.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod account;
mod app_state;
mod category;
mod db;
mod endpoints;
mod expense_type;
mod goal;
mod installment;
mod kind;
mod logging;
mod money;
mod name;
mod owner;
mod payment_method;
mod period;
mod recurrence_type;
mod report;
mod routing;
mod seed;
mod status;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use kind::TransactionKind;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Money;
pub use owner::OwnerId;
pub use routing::build_router;
pub use seed::seed_starter_data;
pub use timezone::get_local_offset;
pub use transaction::{TransactionForm, create_transaction};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a bearer token identifying the owner.
    #[error("missing or malformed bearer token in the Authorization header")]
    MissingOwner,

    /// The request body, query string or path could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An empty string was used as the name of an account, category, etc.
    #[error("name cannot be empty")]
    EmptyName,

    /// An empty string was used as a transaction or plan description.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// A monetary amount that must be positive was zero or negative.
    ///
    /// The direction of a transaction is carried by its kind, never by the
    /// sign of its amount.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Money),

    /// A monetary amount had fractions of a cent.
    #[error("amount must have at most two decimal places, got {0}")]
    InvalidAmountScale(Money),

    /// A monetary amount was too large to be summed safely.
    #[error("amount must be at most one quadrillion either side of zero, got {0}")]
    AmountOutOfRange(Money),

    /// A month outside of 1-12 was given.
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u8),

    /// A year that is not a four-digit year was given.
    #[error("year must be a four-digit year, got {0}")]
    InvalidYear(i32),

    /// An installment plan was given zero or fewer installments.
    #[error("the number of installments must be greater than zero, got {0}")]
    InvalidInstallmentCount(i64),

    /// The number of paid installments was negative or exceeded the total.
    #[error("installments paid must be between 0 and {total}, got {paid}")]
    InstallmentsPaidOutOfRange {
        /// The number of installments paid.
        paid: i64,
        /// The total number of installments.
        total: i64,
    },

    /// A goal was given a target amount of zero or less.
    #[error("goal target amount must be greater than zero, got {0}")]
    InvalidGoalTarget(Money),

    /// A goal was given a negative current amount.
    #[error("goal current amount cannot be negative, got {0}")]
    NegativeGoalAmount(Money),

    /// The end date came before the start date.
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange {
        /// The start of the range.
        start: Date,
        /// The end of the range.
        end: Date,
    },

    /// An ID used to create or update a record did not refer to a valid row,
    /// e.g. a transaction with an account ID that does not exist.
    #[error("a referenced account, category, payment method, expense type or recurrence type does not exist")]
    InvalidReference,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to deactivate an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to deactivate a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to deactivate a payment method that does not exist
    #[error("tried to delete a payment method that is not in the database")]
    DeleteMissingPaymentMethod,

    /// Tried to deactivate an expense type that does not exist
    #[error("tried to delete an expense type that is not in the database")]
    DeleteMissingExpenseType,

    /// Tried to deactivate a recurrence type that does not exist
    #[error("tried to delete a recurrence type that is not in the database")]
    DeleteMissingRecurrenceType,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to update an installment plan that does not exist
    #[error("tried to update an installment plan that is not in the database")]
    UpdateMissingInstallmentPlan,

    /// Tried to delete an installment plan that does not exist
    #[error("tried to delete an installment plan that is not in the database")]
    DeleteMissingInstallmentPlan,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidReference,
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingOwner => StatusCode::UNAUTHORIZED,
            Error::InvalidRequest(_)
            | Error::EmptyName
            | Error::EmptyDescription
            | Error::NonPositiveAmount(_)
            | Error::InvalidAmountScale(_)
            | Error::AmountOutOfRange(_)
            | Error::InvalidMonth(_)
            | Error::InvalidYear(_)
            | Error::InvalidInstallmentCount(_)
            | Error::InstallmentsPaidOutOfRange { .. }
            | Error::InvalidGoalTarget(_)
            | Error::NegativeGoalAmount(_)
            | Error::InvalidDateRange { .. }
            | Error::InvalidReference => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingAccount
            | Error::DeleteMissingAccount
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::DeleteMissingPaymentMethod
            | Error::DeleteMissingExpenseType
            | Error::DeleteMissingRecurrenceType
            | Error::UpdateMissingGoal
            | Error::DeleteMissingGoal
            | Error::UpdateMissingInstallmentPlan
            | Error::DeleteMissingInstallmentPlan => StatusCode::NOT_FOUND,
            Error::SqlError(_) | Error::InvalidTimezoneError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Server errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
