use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::error::AppError;
use crate::services::auth::SecurityContext;
use crate::services::auth::policy::{Decision, DenyReason};
use crate::state::AppState;

pub(super) async fn authorize(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let empty = SecurityContext::new();
    let ctx = req.extensions().get::<SecurityContext>().unwrap_or(&empty);

    match state.policy.allow(req.method(), req.uri().path(), ctx) {
        Decision::Allow => {}
        Decision::Deny(reason) => {
            tracing::debug!(
                ?reason,
                method = %req.method(),
                path = req.uri().path(),
                user_id = ?ctx.principal().map(|p| p.id),
                "request denied by route policy"
            );
            return Err(match reason {
                DenyReason::Unauthenticated => AppError::Unauthorized,
                DenyReason::Forbidden => AppError::Forbidden,
            });
        }
    }

    Ok(next.run(req).await)
}
