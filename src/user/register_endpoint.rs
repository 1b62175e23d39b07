//! The endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash,
    extract::ApiJson,
    user::{NewUser, UserProfile, create_user},
    validation::required_text,
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt work factor used to hash the new user's password.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The request body for registering a user.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// The user's display name.
    pub name: Option<String>,
    /// The email the user will log in with.
    pub email: Option<String>,
    /// The user's raw password.
    pub password: Option<String>,
}

/// The response body for a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Always `true`.
    pub success: bool,
    /// A message confirming the registration.
    pub message: String,
    /// The newly registered user.
    pub user: UserProfile,
}

/// A route handler for registering a new user.
///
/// Responds with 201 Created and the new user on success.
///
/// # Errors
///
/// This function will return an error if:
/// - the name, email or password is missing ([Error::MissingFields]),
/// - the email belongs to an existing user ([Error::DuplicateEmail]),
/// - or the password could not be hashed or the user could not be stored.
pub async fn register_user(
    State(state): State<RegistrationState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    let name = required_text(request.name)?;
    let email = required_text(request.email)?;
    let password = required_text(request.password)?;

    let password_hash = PasswordHash::new(&password, state.password_cost)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = create_user(
        NewUser {
            name,
            email,
            password_hash,
        },
        &connection,
    )?;

    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully.".to_owned(),
            user: UserProfile::from(&user),
        }),
    ))
}
