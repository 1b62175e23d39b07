use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    extract::{ApiJson, ApiPath},
    timestamp::parse_timestamp,
};

use super::{Transaction, TransactionChanges, update_transaction};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of a transaction that may be edited.
///
/// Absent fields are left unchanged. Any owner or ID in the body is ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTransactionRequest {
    /// The new title.
    pub title: Option<String>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new description.
    pub description: Option<String>,
    /// The new date, as an RFC 3339 timestamp or a `YYYY-MM-DD` date.
    pub date: Option<String>,
    /// The new category.
    pub category: Option<String>,
    /// Either "income" or "expense".
    pub transaction_type: Option<String>,
}

impl TryFrom<EditTransactionRequest> for TransactionChanges {
    type Error = Error;

    fn try_from(request: EditTransactionRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: request.title,
            amount: request.amount,
            category: request.category,
            description: request.description,
            date: request.date.as_deref().map(parse_timestamp).transpose()?,
            transaction_type: request
                .transaction_type
                .map(|transaction_type| transaction_type.parse())
                .transpose()?,
        })
    }
}

/// The response body after editing a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct EditTransactionResponse {
    /// Always `true`.
    pub success: bool,
    /// A message confirming the update.
    pub message: String,
    /// The transaction as stored after the update.
    pub transaction: Transaction,
}

/// A route handler for updating some or all fields of a transaction.
///
/// # Errors
///
/// This function will return an error if:
/// - the date cannot be parsed ([Error::InvalidDate]),
/// - the type is not "income" or "expense" ([Error::InvalidTransactionType]),
/// - `transaction_id` does not refer to a stored transaction ([Error::TransactionNotFound]),
/// - or there was an error accessing the database.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    ApiJson(request): ApiJson<EditTransactionRequest>,
) -> Result<Json<EditTransactionResponse>, Error> {
    let changes = TransactionChanges::try_from(request)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = update_transaction(transaction_id, changes, &connection)?;

    Ok(Json(EditTransactionResponse {
        success: true,
        message: "Transaction updated successfully.".to_owned(),
        transaction,
    }))
}
