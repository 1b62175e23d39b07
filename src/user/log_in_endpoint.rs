//! The endpoint for checking a user's credentials.
//!
//! No session or token is issued: a successful log-in only returns the user's
//! profile, which the client keeps.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    extract::ApiJson,
    user::{UserProfile, get_user_by_email},
    validation::required_text,
};

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for logging in.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LogInRequest {
    /// The email the user registered with.
    pub email: Option<String>,
    /// The user's raw password.
    pub password: Option<String>,
}

/// The response body for a successful log-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogInResponse {
    /// Always `true`.
    pub success: bool,
    /// A greeting containing the user's name.
    pub message: String,
    /// The logged in user, without their password.
    pub user: UserProfile,
}

/// Handler for log-in requests via the POST method.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email or password is missing ([Error::MissingFields]).
/// - The email does not belong to a registered user ([Error::InvalidCredentials]).
/// - The password is not correct ([Error::InvalidCredentials]).
/// - An internal error occurred when verifying the password.
pub async fn log_in(
    State(state): State<LogInState>,
    ApiJson(request): ApiJson<LogInRequest>,
) -> Result<Json<LogInResponse>, Error> {
    let email = required_text(request.email)?;
    let password = required_text(request.password)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::UserNotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = user.password_hash.verify(&password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    tracing::info!("User {} logged in", user.id);

    Ok(Json(LogInResponse {
        success: true,
        message: format!("Welcome back, {}!", user.name),
        user: UserProfile::from(&user),
    }))
}
