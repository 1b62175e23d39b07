use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    extract::ApiJson,
    timestamp::parse_timestamp,
    user::{UserId, get_user_by_id},
    validation::required_text,
};

use super::{
    Transaction,
    query::{Frequency, TransactionFilter, TypeFilter, query_transactions},
};

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The filters for listing a user's transactions.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsRequest {
    /// The ID of the user whose transactions are listed.
    pub user_id: Option<UserId>,
    /// "all", "income" or "expense". Defaults to "all".
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
    /// "custom" or a whole number of days.
    pub frequency: Option<String>,
    /// Only used with the "custom" frequency.
    pub start_date: Option<String>,
    /// Only used with the "custom" frequency.
    pub end_date: Option<String>,
}

/// The response body for a transaction listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListTransactionsResponse {
    /// Always `true`.
    pub success: bool,
    /// The matching transactions, oldest first.
    pub transactions: Vec<Transaction>,
}

/// A route handler for listing a user's transactions, oldest first.
///
/// # Errors
///
/// This function will return an error if:
/// - the user ID is missing or does not belong to a registered user ([Error::UserNotFound]),
/// - the frequency is missing or invalid ([Error::MissingFields], [Error::InvalidFrequency]),
/// - the type filter is invalid ([Error::InvalidTransactionType]),
/// - a custom start or end date cannot be parsed ([Error::InvalidDate]),
/// - or there was an error accessing the database.
///
/// The user is checked before the filters.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    ApiJson(request): ApiJson<ListTransactionsRequest>,
) -> Result<Json<ListTransactionsResponse>, Error> {
    let user_id = request.user_id.ok_or(Error::UserNotFound)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_user_by_id(user_id, &connection)?;
    let filter = build_filter(user_id, request, OffsetDateTime::now_utc())?;
    let transactions = query_transactions(&filter, &connection)?;

    Ok(Json(ListTransactionsResponse {
        success: true,
        transactions,
    }))
}

fn build_filter(
    user_id: UserId,
    request: ListTransactionsRequest,
    now: OffsetDateTime,
) -> Result<TransactionFilter, Error> {
    let frequency: Frequency = required_text(request.frequency)?.parse()?;

    let type_filter = match request.type_filter {
        Some(type_filter) => type_filter.parse()?,
        None => TypeFilter::All,
    };

    let (start, end) = match frequency {
        Frequency::Custom => (
            request.start_date.as_deref().map(parse_timestamp).transpose()?,
            request.end_date.as_deref().map(parse_timestamp).transpose()?,
        ),
        Frequency::Days(_) => (None, None),
    };

    Ok(TransactionFilter::new(
        user_id,
        type_filter,
        frequency,
        start,
        end,
        now,
    ))
}


#[cfg(test)]
mod list_transactions_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::{Duration, OffsetDateTime};

    use crate::{
        PasswordHash,
        db::initialize,
        endpoints,
        transaction::{NewTransaction, TransactionType, add_transaction},
        user::{NewUser, User, create_user},
    };

    use super::{ListTransactionsResponse, ListTransactionsState, list_transactions_endpoint};

    fn get_test_server_with_transactions() -> (TestServer, User) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let user = create_user(
            NewUser {
                name: "Alice".to_owned(),
                email: "alice@example.com".to_owned(),
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &connection,
        )
        .expect("Could not create test user");

        let now = OffsetDateTime::now_utc();
        for (title, days_ago, transaction_type) in [
            ("Salary", 2, TransactionType::Income),
            ("Rent", 1, TransactionType::Expense),
            ("Old rent", 40, TransactionType::Expense),
        ] {
            add_transaction(
                NewTransaction {
                    title: title.to_owned(),
                    amount: 100.0,
                    category: "Misc".to_owned(),
                    description: String::new(),
                    date: now - Duration::days(days_ago),
                    transaction_type,
                    user_id: user.id,
                },
                &connection,
            )
            .expect("Could not add transaction");
        }

        let state = ListTransactionsState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::TRANSACTIONS_QUERY, post(list_transactions_endpoint))
            .with_state(state);

        (
            TestServer::new(app).expect("Could not create test server."),
            user,
        )
    }

    #[tokio::test]
    async fn lists_transactions_in_window() {
        let (server, user) = get_test_server_with_transactions();

        let response = server
            .post(endpoints::TRANSACTIONS_QUERY)
            .json(&json!({"userId": user.id, "type": "all", "frequency": "7"}))
            .await;

        response.assert_status_ok();
        let body = response.json::<ListTransactionsResponse>();
        assert!(body.success);
        let titles: Vec<&str> = body
            .transactions
            .iter()
            .map(|transaction| transaction.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Salary", "Rent"]);
    }

    #[tokio::test]
    async fn lists_only_expenses() {
        let (server, user) = get_test_server_with_transactions();

        let body = server
            .post(endpoints::TRANSACTIONS_QUERY)
            .json(&json!({"userId": user.id, "type": "expense", "frequency": "365"}))
            .await
            .json::<ListTransactionsResponse>();

        assert_eq!(body.transactions.len(), 2);
        assert!(
            body.transactions
                .iter()
                .all(|transaction| transaction.transaction_type == TransactionType::Expense)
        );
    }

    #[tokio::test]
    async fn list_fails_for_unknown_user() {
        let (server, _) = get_test_server_with_transactions();

        let response = server
            .post(endpoints::TRANSACTIONS_QUERY)
            .json(&json!({"userId": 999, "type": "all", "frequency": "7"}))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({"success": false, "message": "User not found."}));
    }

    #[tokio::test]
    async fn unknown_user_is_checked_before_frequency() {
        let (server, _) = get_test_server_with_transactions();

        let response = server
            .post(endpoints::TRANSACTIONS_QUERY)
            .json(&json!({"userId": 999, "type": "all", "frequency": "weekly"}))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({"success": false, "message": "User not found."}));
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let (server, _) = get_test_server_with_transactions();

        server
            .post(endpoints::TRANSACTIONS_QUERY)
            .json(&json!({"type": "all", "frequency": "7"}))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn list_fails_with_invalid_frequency() {
        let (server, user) = get_test_server_with_transactions();

        server
            .post(endpoints::TRANSACTIONS_QUERY)
            .json(&json!({"userId": user.id, "type": "all", "frequency": "weekly"}))
            .await
            .assert_status_bad_request();
    }
}
