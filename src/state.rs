/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - interceptor / policy for the auth middleware, authenticator for the login handlers
 * - Cloned per request, so everything inside is Arc or cheap to clone
 * - Holds no per-request data: SecurityContext lives in request extensions
 */
use std::sync::Arc;

use crate::services::auth::{AuthenticationInterceptor, AuthorizationPolicy, CredentialAuthenticator};

#[derive(Clone)]
pub struct AppState {
    pub interceptor: AuthenticationInterceptor,
    pub policy: Arc<AuthorizationPolicy>,
    pub authenticator: CredentialAuthenticator,
}

impl AppState {
    pub fn new(
        interceptor: AuthenticationInterceptor,
        policy: AuthorizationPolicy,
        authenticator: CredentialAuthenticator,
    ) -> Self {
        Self {
            interceptor,
            policy: Arc::new(policy),
            authenticator,
        }
    }
}
