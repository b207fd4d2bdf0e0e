//! Authentication + authorization middleware for the API router.
//!
//! Request flow (outermost first):
//! 1. `authenticate`: bearer token -> SecurityContext in request extensions
//!    (aborts with a plain-text 401 when a presented token is unusable)
//! 2. `authorize`: route table decision over the SecurityContext (401 / 403 JSON)
//! 3. handler
//!
//! The SecurityContext is a request extension, so it is dropped with the request
//! and never shared between concurrent requests.

mod authenticate;
mod authorize;

use axum::{Router, middleware};

use crate::state::AppState;

/// Apply authentication and authorization to the given Router.
///
/// Paths are matched as the router sees them, so apply this after nesting
/// (the route table uses full `/api/v1/...` paths).
pub fn apply(router: Router, state: AppState) -> Router {
    // layers added later run first: authenticate wraps authorize
    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authorize::authorize,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            authenticate::authenticate,
        ))
}
