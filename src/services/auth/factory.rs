// Factory: build `TokenService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::TokenService;
use crate::services::clock::Clock;

pub fn build_token_service(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> Result<Arc<TokenService>, AppError> {
    let tokens = TokenService::new(&config.jwt_signing_key, config.jwt_ttl, clock).map_err(|err| {
        tracing::error!(error = %err, "token service configuration rejected");
        AppError::Internal
    })?;

    Ok(Arc::new(tokens))
}
