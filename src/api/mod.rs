// HTTP and WebSocket APIs

pub mod actions;
pub mod query;
pub mod websocket;

pub use actions::create_action_router;
pub use query::create_query_router;
pub use websocket::create_ws_router;

use crate::state::{GameState, SYSTEM_USER};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Longest accepted user identity, in characters
pub const MAX_USER_LEN: usize = 32;

/// Shared application state for every router
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<GameState>,
}

/// Build the full application router
pub fn create_app(game: Arc<GameState>) -> Router {
    let state = Arc::new(AppState { game });

    Router::new()
        .merge(create_ws_router(Arc::clone(&state)))
        .merge(create_query_router(Arc::clone(&state)))
        .merge(create_action_router(state))
        .layer(CorsLayer::permissive())
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// API error types
#[derive(Debug, PartialEq)]
pub enum ApiError {
    MissingUser,
    InvalidUser(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            ApiError::MissingUser => "user is required".to_string(),
            ApiError::InvalidUser(reason) => format!("invalid user: {}", reason),
        };

        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
    }
}

/// Validate a user identity supplied by a client.
///
/// Surrounding whitespace is trimmed. The reserved `system` identity is
/// rejected so clients cannot impersonate the decay scheduler.
pub fn normalize_user(raw: Option<&str>) -> Result<String, ApiError> {
    let user = raw.map(str::trim).unwrap_or_default();

    if user.is_empty() {
        return Err(ApiError::MissingUser);
    }
    if user.chars().count() > MAX_USER_LEN {
        return Err(ApiError::InvalidUser(format!(
            "must be at most {} characters",
            MAX_USER_LEN
        )));
    }
    if user.chars().any(char::is_control) {
        return Err(ApiError::InvalidUser(
            "must not contain control characters".to_string(),
        ));
    }
    if user.eq_ignore_ascii_case(SYSTEM_USER) {
        return Err(ApiError::InvalidUser(format!("'{}' is reserved", SYSTEM_USER)));
    }

    Ok(user.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_user_trims() {
        assert_eq!(normalize_user(Some("  alice ")), Ok("alice".to_string()));
    }

    #[test]
    fn test_normalize_user_rejects_missing() {
        assert_eq!(normalize_user(None), Err(ApiError::MissingUser));
        assert_eq!(normalize_user(Some("   ")), Err(ApiError::MissingUser));
    }

    #[test]
    fn test_normalize_user_rejects_reserved_and_malformed() {
        assert!(matches!(
            normalize_user(Some("System")),
            Err(ApiError::InvalidUser(_))
        ));
        assert!(matches!(
            normalize_user(Some("bad\u{7}name")),
            Err(ApiError::InvalidUser(_))
        ));
        let long = "x".repeat(MAX_USER_LEN + 1);
        assert!(matches!(
            normalize_user(Some(&long)),
            Err(ApiError::InvalidUser(_))
        ));
    }
}
