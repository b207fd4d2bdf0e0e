//! Password hashing behind a trait so the authenticator does not depend on bcrypt directly.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Blocking, CPU-bound. Callers on the async path should use `spawn_blocking`.
pub trait PasswordVerifier: Send + Sync + 'static {
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    // `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, PasswordError>;
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordVerifier {
    cost: u32,
}

impl BcryptPasswordVerifier {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl PasswordVerifier for BcryptPasswordVerifier {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, PasswordError> {
        Ok(bcrypt::verify(password, password_hash)?)
    }
}
