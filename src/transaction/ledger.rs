//! Operations that change a transaction together with its owner's
//! transaction references.
//!
//! Every transaction appears exactly once in the reference collection of the
//! user whose ID it stores, and nowhere else. The functions here are the only
//! code that creates or deletes transactions outside of tests.

use rusqlite::Connection;

use crate::{
    Error,
    database_id::TransactionId,
    user::{UserId, append_transaction_ref, get_user_by_id, remove_transaction_ref},
};

use super::core::{NewTransaction, Transaction, create_transaction, delete_transaction};

/// Record `new_transaction` and add it to its owner's transaction references.
///
/// # Errors
/// This function will return a:
/// - [Error::UserNotFound] if the owner is not a registered user,
/// - or [Error::SqlError] if there is some SQL error.
pub fn add_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    get_user_by_id(new_transaction.user_id, connection)?;

    let transaction = create_transaction(new_transaction, connection)?;
    append_transaction_ref(transaction.user_id, transaction.id, connection)?;

    tracing::debug!(
        "Added transaction {} for user {}",
        transaction.id,
        transaction.user_id
    );

    Ok(transaction)
}

/// Delete the transaction `transaction_id` on behalf of `user_id` and remove
/// it from its owner's transaction references.
///
/// The reference is removed from the user stored on the transaction, which
/// keeps the references consistent even if `user_id` is someone else.
///
/// # Errors
/// This function will return a:
/// - [Error::UserNotFound] if `user_id` is not a registered user,
/// - [Error::TransactionNotFound] if `transaction_id` does not refer to a stored transaction,
/// - or [Error::SqlError] if there is some SQL error.
pub fn remove_transaction(
    user_id: UserId,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    get_user_by_id(user_id, connection)?;

    let transaction = delete_transaction(transaction_id, connection)?;
    remove_transaction_ref(transaction.user_id, transaction.id, connection)?;

    if transaction.user_id != user_id {
        tracing::warn!(
            "User {user_id} deleted transaction {transaction_id} owned by user {}",
            transaction.user_id
        );
    }

    Ok(transaction)
}
