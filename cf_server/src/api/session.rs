//! Session middleware for seat-bound endpoints.
//!
//! Player identity is established upstream (a gateway or session service) and arrives in the
//! `x-user-id` header. The middleware checks it and injects the user ID into request
//! extensions for downstream handlers.
//!
//! # Extracting User ID
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//!
//! async fn seated_handler(Extension(user_id): Extension<i64>) -> String {
//!     format!("Acting as user {}", user_id)
//! }
//! # let _ = seated_handler;
//! ```

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use connect_four::room::UserId;

/// Header carrying the session's user ID
pub const USER_ID_HEADER: &str = "x-user-id";

/// Parse a positive user ID out of the session header
pub fn user_id_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<UserId>().ok())
        .filter(|&user_id| user_id > 0)
}

/// Middleware that rejects requests without a session and injects the user ID.
///
/// - **Valid header**: injects `user_id: i64` into request extensions, calls the next handler
/// - **Missing or malformed header**: returns `401 Unauthorized`
pub async fn session_middleware(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let Some(user_id) = user_id_from_headers(request.headers()) else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user_id);
    Ok(next.run(request).await)
}
