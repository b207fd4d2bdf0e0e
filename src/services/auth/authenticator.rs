/*
 * Responsibility
 * - Login surface: register (hash + persist + issue) and authenticate (verify + issue)
 * - bcrypt runs on the blocking pool; the request task only awaits it
 * - Storage / hashing failures are logged here and surface as AuthenticationFailed
 */
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::repos::error::RepoError;
use crate::repos::user_store::UserStore;
use crate::services::auth::claims::Token;
use crate::services::auth::error::AuthError;
use crate::services::auth::password::{PasswordError, PasswordVerifier};
use crate::services::auth::principal::{NewPrincipal, Role};
use crate::services::auth::token_service::TokenService;

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct Registration {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// Verified against when the identifier is unknown, so that path costs one bcrypt check too.
const UNKNOWN_PRINCIPAL_PASSWORD: &str = "unknown-principal-placeholder";

#[derive(Clone)]
pub struct CredentialAuthenticator {
    users: Arc<dyn UserStore>,
    passwords: Arc<dyn PasswordVerifier>,
    tokens: Arc<TokenService>,
    default_role: Role,
    // same verifier and cost as real hashes
    unknown_principal_hash: Arc<str>,
}

impl CredentialAuthenticator {
    /// Hashes the placeholder password once (blocking), so call this at startup.
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: Arc<dyn PasswordVerifier>,
        tokens: Arc<TokenService>,
    ) -> Result<Self, PasswordError> {
        let unknown_principal_hash = passwords.hash(UNKNOWN_PRINCIPAL_PASSWORD)?.into();

        Ok(Self {
            users,
            passwords,
            tokens,
            default_role: Role::default(),
            unknown_principal_hash,
        })
    }

    pub async fn register(&self, registration: Registration) -> Result<Token, AuthError> {
        let Registration {
            firstname,
            lastname,
            email,
            password,
        } = registration;

        let passwords = self.passwords.clone();
        let password_hash = run_blocking(move || passwords.hash(&password)).await?;

        let principal = self
            .users
            .create(NewPrincipal {
                firstname,
                lastname,
                email,
                password_hash,
                role: self.default_role,
            })
            .await
            .map_err(|err| match err {
                RepoError::Conflict => AuthError::IdentifierTaken,
                err => {
                    warn!(
                        error = ?err,
                        backend = self.users.backend_name(),
                        "principal creation failed"
                    );
                    AuthError::AuthenticationFailed
                }
            })?;

        info!(user_id = %principal.id, role = %principal.role, "principal registered");

        Ok(self.tokens.generate_token(&principal)?)
    }

    pub async fn authenticate(&self, credentials: Credentials) -> Result<Token, AuthError> {
        let Credentials { email, password } = credentials;

        let principal = match self.users.load_by_identifier(&email).await {
            Ok(Some(principal)) => principal,
            Ok(None) => {
                let passwords = self.passwords.clone();
                let hash = self.unknown_principal_hash.clone();
                run_blocking(move || passwords.verify(&password, &hash)).await?;
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => {
                warn!(
                    error = ?err,
                    backend = self.users.backend_name(),
                    "principal lookup failed"
                );
                return Err(AuthError::AuthenticationFailed);
            }
        };

        let passwords = self.passwords.clone();
        let password_hash = principal.password_hash.clone();
        let matches = run_blocking(move || passwords.verify(&password, &password_hash)).await?;

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.tokens.generate_token(&principal)?)
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            warn!(error = ?err, "password hashing failed");
            Err(AuthError::AuthenticationFailed)
        }
        Err(err) => {
            warn!(error = ?err, "password task did not complete");
            Err(AuthError::AuthenticationFailed)
        }
    }
}
