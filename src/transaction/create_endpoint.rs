use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    extract::ApiJson,
    timestamp::parse_timestamp,
    user::UserId,
    validation::{required_amount, required_text},
};

use super::{NewTransaction, TransactionType, add_transaction};

/// The state needed for adding a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for adding a transaction.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// A short name for the transaction.
    pub title: Option<String>,
    /// The amount of money. Must not be zero.
    pub amount: Option<f64>,
    /// Free text describing the transaction.
    pub description: Option<String>,
    /// An RFC 3339 timestamp or a `YYYY-MM-DD` date.
    pub date: Option<String>,
    /// The category the transaction is grouped under.
    pub category: Option<String>,
    /// The ID of the user that owns the transaction.
    pub user_id: Option<UserId>,
    /// Either "income" or "expense".
    pub transaction_type: Option<String>,
}

/// The response body after adding a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    /// Always `true`.
    pub success: bool,
    /// A message confirming the transaction was added.
    pub message: String,
}

/// A route handler for recording a new transaction for a user.
///
/// # Errors
///
/// This function will return an error if:
/// - a field is missing or empty, or the amount is zero ([Error::MissingFields]),
/// - the date cannot be parsed ([Error::InvalidDate]),
/// - the type is not "income" or "expense" ([Error::InvalidTransactionType]),
/// - the user ID is missing or does not belong to a registered user ([Error::UserNotFound]),
/// - or there was an error accessing the database.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    ApiJson(request): ApiJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<CreateTransactionResponse>), Error> {
    let title = required_text(request.title)?;
    let amount = required_amount(request.amount)?;
    let description = required_text(request.description)?;
    let date = required_text(request.date)?;
    let category = required_text(request.category)?;
    let transaction_type = required_text(request.transaction_type)?;

    let date = parse_timestamp(&date)?;
    let transaction_type: TransactionType = transaction_type.parse()?;
    let user_id = request.user_id.ok_or(Error::UserNotFound)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    add_transaction(
        NewTransaction {
            title,
            amount,
            category,
            description,
            date,
            transaction_type,
            user_id,
        },
        &connection,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTransactionResponse {
            success: true,
            message: "Transaction added successfully.".to_owned(),
        }),
    ))
}
