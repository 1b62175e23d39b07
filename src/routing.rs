//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::{
    AppState, Error, endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        list_transactions_endpoint,
    },
    user::{list_other_users_endpoint, log_in, register_user, set_avatar_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN_API, post(log_in))
        .route(endpoints::USER_AVATAR, put(set_avatar_endpoint))
        .route(endpoints::OTHER_USERS, get(list_other_users_endpoint));

    let transaction_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_QUERY,
            post(list_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        );

    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .merge(user_routes)
        .merge(transaction_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
