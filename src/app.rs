/*
 * Responsibility
 * - Config -> dependencies -> Router
 * - Middleware order (outermost first): http (request id, trace, body limit, timeout) -> auth -> routes
 * - axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::{self, http::HttpLimits};
use crate::repos::{
    memory_user_store::InMemoryUserStore, user_repo::PgUserStore, user_store::UserStore,
};
use crate::services::auth::{
    AuthenticationInterceptor, CredentialAuthenticator, TokenService, build_token_service,
    password::{BcryptPasswordVerifier, PasswordError, PasswordVerifier},
};
use crate::services::clock::SystemClock;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,hello_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    // development: crash on panic so it gets noticed
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );
    tracing::debug!(?config, "loaded config");

    let state = build_state(&config).await?;
    let app = build_router(state, HttpLimits::from(&config));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            Arc::new(PgUserStore::connect(url, config.database_max_connections).await?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, principals are kept in memory");
            Arc::new(InMemoryUserStore::new())
        }
    };
    tracing::info!(backend = users.backend_name(), "user store ready");

    let tokens = build_token_service(config, Arc::new(SystemClock))?;
    tracing::info!(ttl_seconds = tokens.ttl().num_seconds(), "token service ready");
    let passwords = Arc::new(BcryptPasswordVerifier::new(config.bcrypt_cost));

    Ok(assemble_state(users, tokens, passwords)?)
}

pub(crate) fn assemble_state(
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    passwords: Arc<dyn PasswordVerifier>,
) -> Result<AppState, PasswordError> {
    let interceptor = AuthenticationInterceptor::new(tokens.clone(), users.clone());
    let authenticator = CredentialAuthenticator::new(users, passwords, tokens)?;

    let policy = api::v1::policy();
    tracing::debug!(entries = policy.entries().len(), "route policy loaded");

    Ok(AppState::new(interceptor, policy, authenticator))
}

async fn not_found() -> AppError {
    AppError::NotFound
}

pub(crate) fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let router = Router::new()
        .nest(api::v1::PREFIX, api::v1::routes())
        .fallback(not_found)
        .with_state(state.clone());

    let router = middleware::auth::apply(router, state);

    middleware::http::apply(router, limits)
}
