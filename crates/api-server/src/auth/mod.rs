//! Auth primitives: user accounts, password hashing, bearer tokens.

mod store;

use axum::http::{header, HeaderMap};

pub use store::{AuthError, AuthSession, AuthStore, Claims, UserSummary};

/// Extract the bearer token from an Authorization header, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}
