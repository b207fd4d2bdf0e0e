/*
 * Responsibility
 * - Role-gated demo endpoints and the current principal's profile
 * - Role checks happen in the authorize middleware, not here
 */
use axum::Json;

use crate::api::v1::{dto::users::ProfileResponse, extractors::CurrentPrincipal};

pub async fn user_check() -> &'static str {
    "Welcome, USER! You have user-level access."
}

pub async fn admin_check() -> &'static str {
    "Welcome, ADMIN! You have admin-level access."
}

pub async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(&principal))
}
