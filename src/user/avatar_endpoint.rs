//! The endpoint for setting a user's avatar.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    extract::{ApiJson, ApiPath},
    user::UserId,
    validation::required_text,
};

use super::core::set_avatar;

/// The state needed to set a user's avatar.
#[derive(Debug, Clone)]
pub struct AvatarState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AvatarState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for setting an avatar.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SetAvatarRequest {
    /// A reference to the image, e.g. a URL or a data URI.
    pub image: Option<String>,
}

/// The response body after setting an avatar.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvatarResponse {
    /// Whether the user now has an avatar.
    pub is_set: bool,
    /// The stored image reference.
    pub image: Option<String>,
}

/// A route handler for setting the avatar of the user `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - the image is missing ([Error::MissingFields]),
/// - `user_id` does not belong to a registered user ([Error::UserNotFound]),
/// - or there was an error accessing the database.
pub async fn set_avatar_endpoint(
    State(state): State<AvatarState>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(request): ApiJson<SetAvatarRequest>,
) -> Result<Json<SetAvatarResponse>, Error> {
    let image = required_text(request.image)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = set_avatar(user_id, &image, &connection)?;

    Ok(Json(SetAvatarResponse {
        is_set: user.is_avatar_image_set,
        image: user.avatar_image,
    }))
}
