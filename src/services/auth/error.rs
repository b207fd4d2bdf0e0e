use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::auth::token_service::TokenError;

/// Failures on the authentication path (interceptor + login/register).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token is expired")]
    ExpiredToken,
    #[error("principal not found")]
    PrincipalNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identifier already registered")]
    IdentifierTaken,
    #[error("authentication failed")]
    AuthenticationFailed,
}

impl AuthError {
    /// Plain-text body sent by the interceptor when it aborts a request.
    pub fn rejection_message(&self) -> &'static str {
        match self {
            AuthError::ExpiredToken => "Token is expired",
            AuthError::MalformedToken | AuthError::InvalidSignature => "Invalid token",
            _ => "Authentication failed",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed => AuthError::MalformedToken,
            TokenError::InvalidSignature => AuthError::InvalidSignature,
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Signing => AuthError::AuthenticationFailed,
        }
    }
}

// Interceptor boundary: every authentication failure is a 401, never a 5xx.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, self.rejection_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_map_to_three_messages() {
        assert_eq!(
            AuthError::from(TokenError::Expired).rejection_message(),
            "Token is expired"
        );
        assert_eq!(
            AuthError::from(TokenError::Malformed).rejection_message(),
            "Invalid token"
        );
        assert_eq!(
            AuthError::from(TokenError::InvalidSignature).rejection_message(),
            "Invalid token"
        );
        assert_eq!(
            AuthError::PrincipalNotFound.rejection_message(),
            "Authentication failed"
        );
    }

    #[test]
    fn every_kind_renders_as_unauthorized() {
        for err in [
            AuthError::MalformedToken,
            AuthError::ExpiredToken,
            AuthError::PrincipalNotFound,
            AuthError::AuthenticationFailed,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
