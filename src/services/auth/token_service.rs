use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::config::MIN_SIGNING_KEY_BYTES;
use crate::services::auth::claims::{Claims, RESERVED_CLAIMS, Token};
use crate::services::auth::principal::Principal;
use crate::services::clock::Clock;

/// Why a presented token was not accepted.
///
/// Expiry is reported separately from structural / signature problems so the
/// interceptor can tell the client which one happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token is expired")]
    Expired,
    #[error("failed to sign token")]
    Signing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenConfigError {
    #[error("signing key must be at least {MIN_SIGNING_KEY_BYTES} bytes")]
    KeyTooShort,
    #[error("token ttl must be at least one second and keep exp representable")]
    InvalidTtl,
}

/// HS256 token issuer + verifier.
///
/// - Key material is derived once and shared read-only; not printable via Debug.
/// - `jsonwebtoken` checks structure and signature; expiry is checked here against
///   the injected clock with zero leeway (`exp <= now` is expired).
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(
        signing_key: &[u8],
        ttl: std::time::Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenConfigError> {
        if signing_key.len() < MIN_SIGNING_KEY_BYTES {
            return Err(TokenConfigError::KeyTooShort);
        }

        let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenConfigError::InvalidTtl)?;
        if ttl < chrono::Duration::seconds(1) {
            return Err(TokenConfigError::InvalidTtl);
        }
        if clock.now().checked_add_signed(ttl).is_none() {
            return Err(TokenConfigError::InvalidTtl);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
            ttl,
            clock,
        })
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    pub fn generate_token(&self, principal: &Principal) -> Result<Token, TokenError> {
        self.generate_token_with_claims(principal, Map::new())
    }

    /// Issue a token for `principal`, merging `extra_claims` into the payload.
    ///
    /// Reserved claim names in `extra_claims` are dropped; they never override
    /// `sub` / `role` / `iat` / `exp`.
    pub fn generate_token_with_claims(
        &self,
        principal: &Principal,
        mut extra_claims: Map<String, Value>,
    ) -> Result<Token, TokenError> {
        for name in RESERVED_CLAIMS {
            if extra_claims.remove(name).is_some() {
                debug!(claim = name, "ignoring reserved claim in extra claims");
            }
        }

        let issued_at = self.clock.now();
        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            error!(ttl_seconds = self.ttl.num_seconds(), "token expiry out of range");
            TokenError::Signing
        })?;

        let claims = Claims {
            sub: principal.identifier().to_string(),
            role: principal.role.as_str().to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            extra: extra_claims,
        };

        let header = Header::new(Algorithm::HS256);
        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map(Token::new)
            .map_err(|e| {
                error!(error = %e, "failed to sign token");
                TokenError::Signing
            })
    }

    /// Verify the signature, then the claim invariants, then expiry.
    pub fn extract_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)?;

        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed);
        }

        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    pub fn extract_claim<T>(
        &self,
        token: &str,
        selector: impl FnOnce(Claims) -> T,
    ) -> Result<T, TokenError> {
        self.extract_claims(token).map(selector)
    }

    pub fn extract_username(&self, token: &str) -> Result<String, TokenError> {
        self.extract_claim(token, |claims| claims.sub)
    }

    /// Signature ok, not expired, and issued for this principal.
    pub fn is_valid_token(&self, token: &str, principal: &Principal) -> bool {
        match self.extract_claims(token) {
            Ok(claims) => claims.sub == principal.identifier(),
            Err(_) => false,
        }
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        // alg in the header is not HS256: the signature cannot be ours
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => {
            debug!(error = %err, "token could not be decoded");
            TokenError::Malformed
        }
    }
}
