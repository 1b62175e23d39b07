//! Filtering a user's transactions by type and date.

use std::str::FromStr;

use rusqlite::{Connection, params_from_iter, types::Value};
use time::{Duration, OffsetDateTime};

use crate::{Error, timestamp::to_unix_millis, user::UserId};

use super::core::{TRANSACTION_COLUMNS, Transaction, TransactionType, map_transaction_row};

/// Which transaction types to include in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Both income and expenses.
    #[default]
    All,
    /// Only transactions of the given type.
    Only(TransactionType),
}

impl FromStr for TypeFilter {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "all" => Ok(TypeFilter::All),
            other => other.parse().map(TypeFilter::Only),
        }
    }
}

/// The window of time a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// The last `n` days up to now.
    Days(u32),
    /// The range given by the caller's start and end dates.
    Custom,
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();

        if trimmed == "custom" {
            return Ok(Frequency::Custom);
        }

        trimmed
            .parse()
            .map(Frequency::Days)
            .map_err(|_| Error::InvalidFrequency(text.to_owned()))
    }
}

/// A bound on transaction dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// Dates strictly after the timestamp.
    After(OffsetDateTime),
    /// Dates from `start` to `end`, both inclusive.
    Between {
        /// The earliest date to include.
        start: OffsetDateTime,
        /// The latest date to include.
        end: OffsetDateTime,
    },
}

/// The conditions a transaction must meet to be listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only transactions owned by this user are listed.
    pub user_id: UserId,
    /// Which transaction types to include.
    pub type_filter: TypeFilter,
    /// The date bound, or `None` to include every date.
    pub date_filter: Option<DateFilter>,
}

impl TransactionFilter {
    /// Build a filter for the transactions of `user_id`.
    ///
    /// A [Frequency::Days] window ends at `now` and excludes its start
    /// instant. A [Frequency::Custom] window uses `start` and `end` when both
    /// are given and otherwise applies no date bound.
    pub fn new(
        user_id: UserId,
        type_filter: TypeFilter,
        frequency: Frequency,
        start: Option<OffsetDateTime>,
        end: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> Self {
        let date_filter = match frequency {
            // A window reaching past the earliest representable date includes every date.
            Frequency::Days(days) => now
                .checked_sub(Duration::days(i64::from(days)))
                .map(DateFilter::After),
            Frequency::Custom => match (start, end) {
                (Some(start), Some(end)) => Some(DateFilter::Between { start, end }),
                _ => None,
            },
        };

        Self {
            user_id,
            type_filter,
            date_filter,
        }
    }
}

/// Get the transactions matching `filter`, sorted by date and then ID.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn query_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut conditions = vec!["user_id = ?"];
    let mut params = vec![Value::Integer(filter.user_id.as_i64())];

    if let TypeFilter::Only(transaction_type) = filter.type_filter {
        conditions.push("transaction_type = ?");
        params.push(Value::Text(transaction_type.as_str().to_owned()));
    }

    match filter.date_filter {
        Some(DateFilter::After(start)) => {
            conditions.push("date > ?");
            params.push(Value::Integer(to_unix_millis(start)));
        }
        Some(DateFilter::Between { start, end }) => {
            conditions.push("date BETWEEN ? AND ?");
            params.push(Value::Integer(to_unix_millis(start)));
            params.push(Value::Integer(to_unix_millis(end)));
        }
        None => {}
    }

    // Sort by date, and then ID to keep transaction order stable after updates
    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE {} ORDER BY date ASC, id ASC",
        conditions.join(" AND ")
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}
