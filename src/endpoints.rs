//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/users/{user_id}/avatar', use [format_endpoint].

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for registering users.
pub const USERS: &str = "/api/users";
/// The route for checking a user's credentials.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for setting a user's avatar.
pub const USER_AVATAR: &str = "/api/users/{user_id}/avatar";
/// The route for listing every user except the one in the path.
pub const OTHER_USERS: &str = "/api/users/{user_id}/others";
/// The route for adding transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for listing a user's transactions with filters in the request body.
pub const TRANSACTIONS_QUERY: &str = "/api/transactions/query";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter starts with a left brace and ends with the next right brace,
/// e.g. '{user_id}' in '/api/users/{user_id}/avatar'. Only the first
/// parameter is replaced.
///
/// If no parameter is found in `endpoint_path`, the original `endpoint_path`
/// is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::COFFEE);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::USER_AVATAR, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::OTHER_USERS, 1));
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_QUERY);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::TRANSACTION, 1));
    }

    #[test]
    fn replaces_trailing_parameter() {
        assert_eq!(
            format_endpoint(endpoints::TRANSACTION, 42),
            "/api/transactions/42"
        );
    }

    #[test]
    fn replaces_parameter_in_middle() {
        assert_eq!(
            format_endpoint(endpoints::USER_AVATAR, 7),
            "/api/users/7/avatar"
        );
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        assert_eq!(
            format_endpoint(endpoints::TRANSACTIONS_API, 1),
            endpoints::TRANSACTIONS_API
        );
    }

    #[test]
    fn unclosed_parameter_consumes_rest_of_path() {
        assert_eq!(format_endpoint("/hello/{world", 1), "/hello/1");
    }
}
