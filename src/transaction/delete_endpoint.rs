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
    user::UserId,
};

use super::remove_transaction;

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for deleting a transaction.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTransactionRequest {
    /// The ID of the user asking for the deletion.
    pub user_id: Option<UserId>,
}

/// The response body after deleting a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTransactionResponse {
    /// Always `true`.
    pub success: bool,
    /// A message confirming the deletion.
    pub message: String,
}

/// A route handler for deleting a transaction and removing it from its
/// owner's transaction references.
///
/// # Errors
///
/// This function will return an error if:
/// - the user ID is missing or does not belong to a registered user ([Error::UserNotFound]),
///   which includes a body that is absent or cannot be read,
/// - `transaction_id` does not refer to a stored transaction ([Error::TransactionNotFound]),
/// - or there was an error accessing the database.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    request: Result<ApiJson<DeleteTransactionRequest>, Error>,
) -> Result<Json<DeleteTransactionResponse>, Error> {
    let user_id = request
        .ok()
        .and_then(|ApiJson(request)| request.user_id)
        .ok_or(Error::UserNotFound)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    remove_transaction(user_id, transaction_id, &connection)?;

    Ok(Json(DeleteTransactionResponse {
        success: true,
        message: "Transaction deleted successfully.".to_owned(),
    }))
}
