//! Fintrack is a personal finance tracker for recording income and expenses.
//!
//! This library provides a JSON REST API for registering users, logging in,
//! and managing each user's transactions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
pub mod endpoints;
mod extract;
mod logging;
mod password;
mod routing;
mod timestamp;
mod transaction;
mod user;
mod validation;

pub use app_state::AppState;
pub use database_id::{DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::PasswordHash;
pub use routing::build_router;
pub use timestamp::parse_timestamp;
pub use transaction::{
    NewTransaction, Transaction, TransactionType, add_transaction, get_transaction,
};
pub use user::{NewUser, User, UserId, create_user, get_user_by_email, get_user_by_id};

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
    /// A required field was missing from the request, or it was empty.
    #[error("All fields are required.")]
    MissingFields,

    /// A date string could not be parsed as either an RFC 3339 timestamp or
    /// a `YYYY-MM-DD` date.
    #[error("invalid date \"{0}\", expected an RFC 3339 timestamp or a YYYY-MM-DD date")]
    InvalidDate(String),

    /// The frequency for listing transactions was neither "custom" nor a
    /// whole number of days.
    #[error("invalid frequency \"{0}\", expected \"custom\" or a whole number of days")]
    InvalidFrequency(String),

    /// The request body could not be read as the expected JSON object.
    #[error("{0}")]
    InvalidBody(String),

    /// A transaction type was not one of "income" or "expense" (or "all" when
    /// filtering).
    #[error("invalid transaction type \"{0}\"")]
    InvalidTransactionType(String),

    /// The email used to register a user belongs to an existing user.
    #[error("User already exists.")]
    DuplicateEmail,

    /// The email does not belong to a user, or the password was wrong.
    ///
    /// The two cases share one error so that clients cannot tell which
    /// emails are registered.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// The user ID in the request does not refer to a registered user.
    #[error("User not found.")]
    UserNotFound,

    /// The transaction ID in the request does not refer to a stored transaction.
    #[error("Transaction not found.")]
    TransactionNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error occurs when a query returns no rows. Callers
    /// that know which resource was missing should map it to
    /// [Error::UserNotFound] or [Error::TransactionNotFound].
    #[error("The requested resource could not be found.")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing or deserializing stored JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}

impl Error {
    /// The HTTP status code that the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFields
            | Error::InvalidDate(_)
            | Error::InvalidFrequency(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::UserNotFound | Error::TransactionNotFound | Error::NotFound => {
                StatusCode::NOT_FOUND
            }
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::JSONSerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct FailureBody {
    success: bool,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        let body = FailureBody {
            success: false,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
