//! Defines the user model and the database functions for the user directory.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension, Row, types::Type};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The email the user logs in with. Unique across all users.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// A reference to the user's avatar image, e.g. a URL or a data URI.
    pub avatar_image: Option<String>,
    /// Whether the user has chosen an avatar.
    pub is_avatar_image_set: bool,
    /// The IDs of the transactions owned by this user, in the order they were added.
    ///
    /// This is a denormalized copy of the `user_id` column of the transaction
    /// table and is kept up to date by the transaction endpoints.
    pub transaction_ids: Vec<TransactionId>,
}

/// The data needed to register a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's display name.
    pub name: String,
    /// The email the user logs in with.
    pub email: String,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
}

/// The user as it is sent to clients, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The user's ID.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The user's email.
    pub email: String,
    /// A reference to the user's avatar image.
    pub avatar_image: Option<String>,
    /// Whether the user has chosen an avatar.
    pub is_avatar_image_set: bool,
    /// The IDs of the transactions owned by the user.
    pub transactions: Vec<TransactionId>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_image: user.avatar_image.clone(),
            is_avatar_image_set: user.is_avatar_image_set,
            transactions: user.transaction_ids.clone(),
        }
    }
}

/// The public details of a user that other users may see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// The user's ID.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The user's email.
    pub email: String,
    /// A reference to the user's avatar image.
    pub avatar_image: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const USER_COLUMNS: &str =
    "id, name, email, password, avatar_image, is_avatar_image_set, transaction_ids";

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                avatar_image TEXT,
                is_avatar_image_set INTEGER NOT NULL DEFAULT 0,
                transaction_ids TEXT NOT NULL DEFAULT '[]'
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if a user with the same email already exists,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare(&format!(
            "INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3) RETURNING {USER_COLUMNS}"
        ))?
        .query_row(
            (
                &new_user.name,
                &new_user.email,
                new_user.password_hash.as_ref(),
            ),
            map_user_row,
        )?;

    Ok(user)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(map_user_not_found)
}

/// Get the user from the database whose email is exactly `email`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::UserNotFound] if `email` does not belong to a registered user,
/// - or [Error::SqlError] if there was an error trying to access the store.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = :email"))?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(map_user_not_found)
}

/// Set the avatar of the user `user_id` to `image` and mark the avatar as set.
///
/// Returns the updated user.
///
/// # Errors
///
/// This function will return a:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there was an error trying to access the store.
pub fn set_avatar(user_id: UserId, image: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!(
            "UPDATE user SET is_avatar_image_set = 1, avatar_image = ?1 WHERE id = ?2 \
            RETURNING {USER_COLUMNS}"
        ))?
        .query_row((image, user_id.as_i64()), map_user_row)
        .map_err(map_user_not_found)
}

/// Get every user except `excluded_id`, ordered by ID.
///
/// # Errors
///
/// Returns an [Error::SqlError] if there was an error trying to access the store.
pub fn get_other_users(
    excluded_id: UserId,
    connection: &Connection,
) -> Result<Vec<UserSummary>, Error> {
    connection
        .prepare(
            "SELECT id, name, email, avatar_image FROM user WHERE id != :id ORDER BY id ASC",
        )?
        .query_map(&[(":id", &excluded_id.as_i64())], |row| {
            Ok(UserSummary {
                id: UserId::new(row.get(0)?),
                name: row.get(1)?,
                email: row.get(2)?,
                avatar_image: row.get(3)?,
            })
        })?
        .map(|maybe_user| maybe_user.map_err(Error::from))
        .collect()
}

/// Append `transaction_id` to the reference collection of the user `user_id`.
///
/// This is a read-modify-write of the user row and is not atomic with the
/// write that created the transaction.
///
/// # Errors
///
/// This function will return a:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there was an error trying to access the store.
pub fn append_transaction_ref(
    user_id: UserId,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let mut transaction_ids = get_transaction_refs(user_id, connection)?;
    transaction_ids.push(transaction_id);

    save_transaction_refs(user_id, &transaction_ids, connection)
}

/// Remove every occurrence of `transaction_id` from the reference collection
/// of the user `user_id`.
///
/// Removing an ID that is not in the collection is not an error.
///
/// # Errors
///
/// This function will return a:
/// - [Error::UserNotFound] if `user_id` does not belong to a registered user,
/// - or [Error::SqlError] if there was an error trying to access the store.
pub fn remove_transaction_ref(
    user_id: UserId,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let mut transaction_ids = get_transaction_refs(user_id, connection)?;
    transaction_ids.retain(|id| *id != transaction_id);

    save_transaction_refs(user_id, &transaction_ids, connection)
}

fn get_transaction_refs(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<TransactionId>, Error> {
    let raw_ids: Option<String> = connection
        .query_row(
            "SELECT transaction_ids FROM user WHERE id = :id",
            &[(":id", &user_id.as_i64())],
            |row| row.get(0),
        )
        .optional()?;

    match raw_ids {
        Some(raw_ids) => Ok(serde_json::from_str(&raw_ids)?),
        None => Err(Error::UserNotFound),
    }
}

fn save_transaction_refs(
    user_id: UserId,
    transaction_ids: &[TransactionId],
    connection: &Connection,
) -> Result<(), Error> {
    let raw_ids = serde_json::to_string(transaction_ids)?;

    let rows_affected = connection.execute(
        "UPDATE user SET transaction_ids = ?1 WHERE id = ?2",
        (raw_ids, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UserNotFound);
    }

    Ok(())
}

fn map_user_not_found(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound,
        error => error.into(),
    }
}

/// Map a database row to a [User].
///
/// The row must contain the columns in [USER_COLUMNS] order.
fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;
    let raw_transaction_ids: String = row.get(6)?;

    let transaction_ids = serde_json::from_str(&raw_transaction_ids).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(error))
    })?;

    Ok(User {
        id: UserId::new(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        avatar_image: row.get(4)?,
        is_avatar_image_set: row.get(5)?,
        transaction_ids,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{Error, PasswordHash};

    use super::{
        NewUser, UserId, UserProfile, append_transaction_ref, create_user, create_user_table,
        get_other_users, get_user_by_email, get_user_by_id, remove_transaction_ref, set_avatar,
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();

        let inserted_user = create_user(new_user("Alice", "alice@example.com"), &db_connection)
            .expect("Could not create user");

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.name, "Alice");
        assert_eq!(inserted_user.email, "alice@example.com");
        assert_eq!(inserted_user.password_hash, PasswordHash::new_unchecked("hunter2"));
        assert_eq!(inserted_user.avatar_image, None);
        assert!(!inserted_user.is_avatar_image_set);
        assert!(inserted_user.transaction_ids.is_empty());
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let db_connection = get_db_connection();
        create_user(new_user("Alice", "alice@example.com"), &db_connection)
            .expect("Could not create user");

        let result = create_user(new_user("Not Alice", "alice@example.com"), &db_connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn email_match_is_case_sensitive() {
        let db_connection = get_db_connection();
        create_user(new_user("Alice", "alice@example.com"), &db_connection)
            .expect("Could not create user");

        let result = create_user(new_user("Alice", "Alice@example.com"), &db_connection);

        assert!(result.is_ok());
        assert_eq!(
            get_user_by_email("ALICE@EXAMPLE.COM", &db_connection),
            Err(Error::UserNotFound)
        );
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserId::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::UserNotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("Alice", "alice@example.com"), &db_connection)
            .expect("Could not create user");

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("Alice", "alice@example.com"), &db_connection)
            .expect("Could not create user");

        let retrieved_user = get_user_by_email("alice@example.com", &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn set_avatar_updates_image_and_flag() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("Alice", "alice@example.com"), &db_connection)
            .expect("Could not create user");

        let updated_user = set_avatar(test_user.id, "avatars/alice.png", &db_connection)
            .expect("Could not set avatar");

        assert!(updated_user.is_avatar_image_set);
        assert_eq!(updated_user.avatar_image.as_deref(), Some("avatars/alice.png"));
        assert_eq!(get_user_by_id(test_user.id, &db_connection), Ok(updated_user));
    }

    #[test]
    fn set_avatar_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let result = set_avatar(UserId::new(42), "avatars/nobody.png", &db_connection);

        assert_eq!(result, Err(Error::UserNotFound));
    }

    #[test]
    fn get_other_users_excludes_given_user() {
        let db_connection = get_db_connection();
        let alice = create_user(new_user("Alice", "alice@example.com"), &db_connection).unwrap();
        let bob = create_user(new_user("Bob", "bob@example.com"), &db_connection).unwrap();
        let carol = create_user(new_user("Carol", "carol@example.com"), &db_connection).unwrap();

        let others = get_other_users(bob.id, &db_connection).expect("Could not get users");

        let other_ids: Vec<UserId> = others.iter().map(|user| user.id).collect();
        assert_eq!(other_ids, vec![alice.id, carol.id]);
    }

    #[test]
    fn get_other_users_with_unknown_id_returns_everyone() {
        let db_connection = get_db_connection();
        create_user(new_user("Alice", "alice@example.com"), &db_connection).unwrap();
        create_user(new_user("Bob", "bob@example.com"), &db_connection).unwrap();

        let others = get_other_users(UserId::new(999), &db_connection).unwrap();

        assert_eq!(others.len(), 2);
    }

    #[test]
    fn transaction_refs_are_appended_in_order_and_removed() {
        let db_connection = get_db_connection();
        let user = create_user(new_user("Alice", "alice@example.com"), &db_connection).unwrap();

        append_transaction_ref(user.id, 3, &db_connection).unwrap();
        append_transaction_ref(user.id, 1, &db_connection).unwrap();
        append_transaction_ref(user.id, 2, &db_connection).unwrap();
        remove_transaction_ref(user.id, 1, &db_connection).unwrap();

        let user = get_user_by_id(user.id, &db_connection).unwrap();
        assert_eq!(user.transaction_ids, vec![3, 2]);
    }

    #[test]
    fn removing_missing_transaction_ref_is_a_no_op() {
        let db_connection = get_db_connection();
        let user = create_user(new_user("Alice", "alice@example.com"), &db_connection).unwrap();
        append_transaction_ref(user.id, 1, &db_connection).unwrap();

        remove_transaction_ref(user.id, 7, &db_connection).unwrap();

        let user = get_user_by_id(user.id, &db_connection).unwrap();
        assert_eq!(user.transaction_ids, vec![1]);
    }

    #[test]
    fn transaction_refs_fail_for_unknown_user() {
        let db_connection = get_db_connection();

        assert_eq!(
            append_transaction_ref(UserId::new(42), 1, &db_connection),
            Err(Error::UserNotFound)
        );
        assert_eq!(
            remove_transaction_ref(UserId::new(42), 1, &db_connection),
            Err(Error::UserNotFound)
        );
    }

    #[test]
    fn profile_never_contains_password() {
        let db_connection = get_db_connection();
        let user = create_user(new_user("Alice", "alice@example.com"), &db_connection).unwrap();

        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["isAvatarImageSet"], false);
    }
}
