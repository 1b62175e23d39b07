//! The transaction ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the types used to create and edit transactions
//! - Database functions for storing, querying, and deleting transactions
//! - Ledger operations that keep each owner's transaction references in sync
//! - Route handlers for adding, listing, editing and deleting transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod ledger;
mod list_endpoint;
mod query;

pub use self::core::{
    NewTransaction, Transaction, TransactionChanges, TransactionType, create_transaction_table,
    get_transaction, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use ledger::{add_transaction, remove_transaction};
pub use list_endpoint::list_transactions_endpoint;

#[cfg(test)]
pub use self::core::create_transaction;
