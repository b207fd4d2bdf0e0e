/*
 * Responsibility
 * - POST /auth/register, POST /auth/authenticate
 * - DTO validation -> CredentialAuthenticator -> {"token": ...}
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    api::v1::dto::auth::{AuthenticateRequest, AuthenticationResponse, RegisterRequest},
    error::AppError,
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<AuthenticationResponse>, AppError> {
    let Json(req) = payload?;
    req.validate().map_err(AppError::invalid_request)?;

    let token = state.authenticator.register(req.into()).await?;

    Ok(Json(AuthenticationResponse { token }))
}

pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> Result<Json<AuthenticationResponse>, AppError> {
    let Json(req) = payload?;
    req.validate().map_err(AppError::invalid_request)?;

    let token = state.authenticator.authenticate(req.into()).await?;

    Ok(Json(AuthenticationResponse { token }))
}
