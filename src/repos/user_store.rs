//! User storage interface consumed by the authentication core.
use async_trait::async_trait;

use crate::repos::error::RepoResult;
use crate::services::auth::principal::{NewPrincipal, Principal};

/// Loads and creates principals by identifier (email).
///
/// Implementations are shared across requests (`Arc<dyn UserStore>`) and must not
/// cache principals between lookups: every request resolves a fresh principal.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    // Returns the storage backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // `Ok(None)` when no principal has this identifier.
    async fn load_by_identifier(&self, identifier: &str) -> RepoResult<Option<Principal>>;

    // Persist a new principal.
    //
    // Returns `RepoError::Conflict` when the identifier is already taken.
    async fn create(&self, new_principal: NewPrincipal) -> RepoResult<Principal>;
}
