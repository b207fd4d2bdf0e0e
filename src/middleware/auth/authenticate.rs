use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::services::auth::SecurityContext;
use crate::state::AppState;

/// Runs the interceptor once per request.
///
/// On success the (possibly still empty) SecurityContext is stored in the request
/// extensions for `authorize` and the handlers. On failure the request never
/// reaches the handler.
pub(super) async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let mut ctx = req
        .extensions_mut()
        .remove::<SecurityContext>()
        .unwrap_or_default();

    if let Err(err) = state.interceptor.authenticate(req.headers(), &mut ctx).await {
        tracing::warn!(
            error = %err,
            method = %req.method(),
            path = req.uri().path(),
            "request authentication rejected"
        );
        return err.into_response();
    }

    req.extensions_mut().insert(ctx);

    next.run(req).await
}
