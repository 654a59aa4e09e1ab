//! Admin credential extraction (HTTP Basic auth).

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::ApiError;
use crate::AppState;

/// The single admin account name.
pub const ADMIN_USER: &str = "user";

/// Marker for a request carrying valid admin credentials.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser;

/// Rejection returned when credentials are missing or wrong: the usual
/// `UNAUTHORIZED` error body plus a Basic challenge.
#[derive(Debug)]
pub struct AuthError(ApiError);

impl AuthError {
    fn new(message: &str) -> Self {
        Self(ApiError::unauthorized(message))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Basic realm=\"admin\""));
        response
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthError::new("Missing Authorization header"))?;

        let (user, password) = parse_basic(header)
            .ok_or_else(|| AuthError::new("Invalid Authorization header format"))?;

        if user != ADMIN_USER || password != state.config.admin_password {
            tracing::warn!(user = %user, "rejected admin credentials");
            return Err(AuthError::new("Invalid credentials"));
        }

        Ok(AdminUser)
    }
}

/// Split a `Basic <base64(user:password)>` header value.
fn parse_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Build an `Authorization` header value; used by clients and tests.
pub fn basic_header(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_round_tripped_header() {
        let header = basic_header("user", "p:ss");
        assert_eq!(parse_basic(&header), Some(("user".into(), "p:ss".into())));
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert_eq!(parse_basic("Bearer abc"), None);
        assert_eq!(parse_basic("Basic !!!"), None);
        assert_eq!(parse_basic(&format!("Basic {}", STANDARD.encode("nocolon"))), None);
    }

    #[test]
    fn rejection_carries_error_body_and_challenge() {
        let response = AuthError::new("Invalid credentials").into_response();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"admin\""
        );
    }
}
