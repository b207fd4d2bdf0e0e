//! In-process UserStore for development runs without DATABASE_URL, and for tests.
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_store::UserStore;
use crate::services::auth::principal::{NewPrincipal, Principal};

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    // keyed by email
    users: RwLock<HashMap<String, Principal>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn load_by_identifier(&self, identifier: &str) -> RepoResult<Option<Principal>> {
        Ok(self.users.read().await.get(identifier).cloned())
    }

    async fn create(&self, new_principal: NewPrincipal) -> RepoResult<Principal> {
        let mut users = self.users.write().await;
        if users.contains_key(&new_principal.email) {
            return Err(RepoError::Conflict);
        }

        let principal = Principal {
            id: Uuid::new_v4(),
            firstname: new_principal.firstname,
            lastname: new_principal.lastname,
            email: new_principal.email,
            password_hash: new_principal.password_hash,
            role: new_principal.role,
        };
        users.insert(principal.email.clone(), principal.clone());

        Ok(principal)
    }
}
