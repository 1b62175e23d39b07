//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::TransactionId,
    timestamp::{from_unix_millis, to_unix_millis},
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money was earned.
    Income,
    /// Money was spent.
    Expense,
}

impl TransactionType {
    /// The name of the type as it is stored and sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short name for the transaction, e.g. "Rent".
    pub title: String,
    /// The amount of money that was earned or spent.
    pub amount: f64,
    /// A free-form category, e.g. "Housing".
    pub category: String,
    /// A longer text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened, in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The user that owns the transaction. Never changes after creation.
    pub user_id: UserId,
}

/// The data needed to record a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short name for the transaction.
    pub title: String,
    /// The amount of money that was earned or spent.
    pub amount: f64,
    /// A free-form category.
    pub category: String,
    /// A longer text description.
    pub description: String,
    /// When the transaction happened.
    pub date: OffsetDateTime,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The user that will own the transaction.
    pub user_id: UserId,
}

/// A partial update of a transaction.
///
/// Fields set to `None` keep their stored value. The ID and owner of a
/// transaction cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    /// The new title.
    pub title: Option<String>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new category.
    pub category: Option<String>,
    /// The new description.
    pub description: Option<String>,
    /// The new date.
    pub date: Option<OffsetDateTime>,
    /// The new type.
    pub transaction_type: Option<TransactionType>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns read by [map_transaction_row], in order.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, title, amount, category, description, date, transaction_type, user_id";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date INTEGER NOT NULL,
                transaction_type TEXT NOT NULL,
                user_id INTEGER NOT NULL
                )",
        (),
    )?;

    // Covers the owner filter and date ordering of transaction listings.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Insert a new transaction into the database.
///
/// This does not check that the owner exists or update the owner's
/// transaction references, see [super::add_transaction] for that.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
            (title, amount, category, description, date, transaction_type, user_id) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                new_transaction.title,
                new_transaction.amount,
                new_transaction.category,
                new_transaction.description,
                to_unix_millis(new_transaction.date),
                new_transaction.transaction_type,
                new_transaction.user_id.as_i64(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(map_transaction_not_found)
}

/// Apply `changes` to the transaction `id` and return the updated transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    changes: TransactionChanges,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "UPDATE \"transaction\" SET \
                title = COALESCE(?1, title), \
                amount = COALESCE(?2, amount), \
                category = COALESCE(?3, category), \
                description = COALESCE(?4, description), \
                date = COALESCE(?5, date), \
                transaction_type = COALESCE(?6, transaction_type) \
            WHERE id = ?7 \
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                changes.title,
                changes.amount,
                changes.category,
                changes.description,
                changes.date.map(to_unix_millis),
                changes.transaction_type,
                id,
            ),
            map_transaction_row,
        )
        .map_err(map_transaction_not_found)
}

/// Delete the transaction `id` and return it as it was before deletion.
///
/// This does not update the owner's transaction references, see
/// [super::remove_transaction] for that.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "DELETE FROM \"transaction\" WHERE id = :id RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(map_transaction_not_found)
}

fn map_transaction_not_found(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
        error => error.into(),
    }
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in [TRANSACTION_COLUMNS] order.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_date: i64 = row.get(5)?;
    let date = from_unix_millis(raw_date).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Integer, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        date,
        transaction_type: row.get(6)?,
        user_id: UserId::new(row.get(7)?),
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod model_tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{Error, user::UserId};

    use super::{Transaction, TransactionType};

    #[test]
    fn parses_transaction_types() {
        assert_eq!(
            "income".parse::<TransactionType>(),
            Ok(TransactionType::Income)
        );
        assert_eq!(
            "expense".parse::<TransactionType>(),
            Ok(TransactionType::Expense)
        );
        assert_eq!(
            "Income".parse::<TransactionType>(),
            Err(Error::InvalidTransactionType("Income".to_owned()))
        );
    }

    #[test]
    fn serializes_with_camel_case_fields_and_rfc3339_date() {
        let transaction = Transaction {
            id: 3,
            title: "Salary".to_owned(),
            amount: 5000.0,
            category: "Work".to_owned(),
            description: "May salary".to_owned(),
            date: datetime!(2024-05-15 09:30 UTC),
            transaction_type: TransactionType::Income,
            user_id: UserId::new(1),
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(
            json,
            json!({
                "id": 3,
                "title": "Salary",
                "amount": 5000.0,
                "category": "Work",
                "description": "May salary",
                "date": "2024-05-15T09:30:00Z",
                "transactionType": "income",
                "userId": 1
            })
        );
    }
}
