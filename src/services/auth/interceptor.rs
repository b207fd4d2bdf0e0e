//! Per-request authentication: bearer token -> claims -> principal -> SecurityContext.
//!
//! The HTTP wiring lives in `middleware::auth::authenticate`; this type only
//! decides, so it can be driven directly from tests.
//!
//! Outcomes:
//! - no / non-bearer `Authorization` header: `Ok`, context left empty
//! - token cannot be decoded or verified: `Err` (request is aborted with 401)
//! - principal lookup fails: `Err(PrincipalNotFound | AuthenticationFailed)`
//! - token not valid for the loaded principal: `Ok`, context left empty

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use tracing::{debug, warn};

use crate::repos::user_store::UserStore;
use crate::services::auth::context::SecurityContext;
use crate::services::auth::error::AuthError;
use crate::services::auth::token_service::TokenService;

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct AuthenticationInterceptor {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl AuthenticationInterceptor {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        ctx: &mut SecurityContext,
    ) -> Result<(), AuthError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(());
        };

        let claims = self.tokens.extract_claims(token)?;

        if ctx.is_authenticated() {
            debug!("security context already populated, skipping authentication");
            return Ok(());
        }

        let principal = match self.users.load_by_identifier(&claims.sub).await {
            Ok(Some(principal)) => principal,
            Ok(None) => return Err(AuthError::PrincipalNotFound),
            Err(err) => {
                warn!(
                    error = ?err,
                    backend = self.users.backend_name(),
                    "principal lookup failed"
                );
                return Err(AuthError::AuthenticationFailed);
            }
        };

        if !self.tokens.is_valid_token(token, &principal) {
            debug!(user_id = %principal.id, "token not valid for principal");
            return Ok(());
        }

        debug!(
            user_id = %principal.id,
            role = %principal.role,
            issued_at = ?claims.issued_at(),
            expires_at = ?claims.expires_at(),
            "request authenticated"
        );
        ctx.set(principal);

        Ok(())
    }
}

/// Token after `Bearer `, if the header is present and uses that scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}
