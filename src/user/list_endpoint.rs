//! The endpoint for listing the other users of the application.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    extract::ApiPath,
    user::{UserId, UserSummary},
};

use super::core::get_other_users;

/// The state needed to list users.
#[derive(Debug, Clone)]
pub struct ListUsersState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListUsersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists every user except `user_id`.
///
/// Only the ID, name, email and avatar of each user are included.
/// An unknown `user_id` is not an error, it simply excludes nobody.
pub async fn list_other_users_endpoint(
    State(state): State<ListUsersState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<UserSummary>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_other_users(user_id, &connection).map(Json)
}

#[cfg(test)]
mod list_other_users_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;

    use crate::{
        PasswordHash,
        db::initialize,
        endpoints::{self, format_endpoint},
        user::{NewUser, User, UserSummary, core::set_avatar, create_user},
    };

    use super::{ListUsersState, list_other_users_endpoint};

    fn insert_user(name: &str, connection: &Connection) -> User {
        create_user(
            NewUser {
                name: name.to_owned(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: PasswordHash::new_unchecked(&format!("hash-of-{name}")),
            },
            connection,
        )
        .expect("Could not create test user")
    }

    #[tokio::test]
    async fn lists_everyone_but_the_caller() {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let alice = insert_user("Alice", &connection);
        let bob = insert_user("Bob", &connection);
        set_avatar(bob.id, "bob.png", &connection).unwrap();
        let state = ListUsersState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::OTHER_USERS, get(list_other_users_endpoint))
            .with_state(state);
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .get(&format_endpoint(endpoints::OTHER_USERS, alice.id.as_i64()))
            .await;

        response.assert_status_ok();
        let users = response.json::<Vec<UserSummary>>();
        assert_eq!(
            users,
            vec![UserSummary {
                id: bob.id,
                name: "Bob".to_owned(),
                email: "bob@example.com".to_owned(),
                avatar_image: Some("bob.png".to_owned()),
            }]
        );

        let raw_users = response.json::<Value>();
        let fields: Vec<&String> = raw_users[0].as_object().unwrap().keys().collect();
        assert_eq!(fields.len(), 4, "want only 4 public fields, got {fields:?}");
        assert!(raw_users[0].get("password").is_none());
    }
}
