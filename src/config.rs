/*
 * Responsibility
 * - Load environment variables / .env (signing key, token TTL, DATABASE_URL, HTTP limits)
 * - Validate values up front (startup fails when something is missing or invalid)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// HMAC-SHA256 needs at least 256 bits of key material.
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None => in-memory user store (development only)
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Decoded HMAC secret. Never printed.
    pub jwt_signing_key: Vec<u8>,
    pub jwt_ttl: Duration,

    pub bcrypt_cost: u32,

    pub http_timeout: Duration,
    pub http_body_limit_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("database_max_connections", &self.database_max_connections)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("http_timeout", &self.http_timeout)
            .field("http_body_limit_bytes", &self.http_body_limit_bytes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let jwt_signing_key = decode_signing_key(
            &std::env::var("JWT_SECRET_KEY").map_err(|_| ConfigError::Missing("JWT_SECRET_KEY"))?,
        )?;

        let jwt_ttl = match std::env::var("JWT_EXPIRY_TIME") {
            Ok(raw) => parse_ttl_millis(&raw)?,
            Err(_) => Duration::from_secs(24 * 60 * 60),
        };

        let bcrypt_cost = match std::env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|c| (4..=31).contains(c))
                .ok_or(ConfigError::Invalid("BCRYPT_COST"))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        let http_timeout = std::env::var("HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let http_body_limit_bytes = std::env::var("HTTP_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            jwt_signing_key,
            jwt_ttl,
            bcrypt_cost,
            http_timeout,
            http_body_limit_bytes,
        })
    }
}

/// Base64 secret -> raw key bytes. Rejects keys shorter than 256 bits.
pub fn decode_signing_key(encoded: &str) -> Result<Vec<u8>, ConfigError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ConfigError::Invalid("JWT_SECRET_KEY"))?;

    if bytes.len() < MIN_SIGNING_KEY_BYTES {
        return Err(ConfigError::Invalid("JWT_SECRET_KEY"));
    }

    Ok(bytes)
}

// exp/iat are epoch seconds, so anything under one second could issue exp == iat.
// The upper bound is whatever still yields a representable expiry from now.
fn parse_ttl_millis(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms >= 1000)
        .map(Duration::from_millis)
        .filter(|ttl| {
            chrono::Duration::from_std(*ttl)
                .ok()
                .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
                .is_some()
        })
        .ok_or(ConfigError::Invalid("JWT_EXPIRY_TIME"))
}
