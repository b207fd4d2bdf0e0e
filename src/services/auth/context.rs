/*
 * Responsibility
 * - Request-scoped holder of the authenticated principal (SecurityContext)
 * - One value per request: the middleware creates it, stores it in the request
 *   extensions, and it is dropped together with the request on every exit path
 * - Never shared between requests (no global / thread-local holder)
 */
use std::collections::BTreeSet;

use crate::services::auth::principal::Principal;

/// Principal plus the authorities granted for this request.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub principal: Principal,
    pub authorities: BTreeSet<String>,
}

impl Authenticated {
    pub fn new(principal: Principal) -> Self {
        let authorities = principal.authorities();
        Self {
            principal,
            authorities,
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    authentication: Option<Authenticated>,
}

impl SecurityContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&Authenticated> {
        self.authentication.as_ref()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.get().map(|a| &a.principal)
    }

    pub fn set(&mut self, principal: Principal) {
        self.authentication = Some(Authenticated::new(principal));
    }

    pub fn clear(&mut self) {
        self.authentication = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::principal::Role;
    use uuid::Uuid;

    fn admin() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            firstname: Some("Ada".to_string()),
            lastname: None,
            email: "ada@x.com".to_string(),
            password_hash: String::new(),
            role: Role::Admin,
        }
    }

    #[test]
    fn starts_empty() {
        let ctx = SecurityContext::new();
        assert!(!ctx.is_authenticated());
        assert!(ctx.get().is_none());
    }

    #[test]
    fn set_derives_authorities_and_clear_drops_them() {
        let mut ctx = SecurityContext::new();
        ctx.set(admin());

        let auth = ctx.get().unwrap();
        assert_eq!(auth.principal.email, "ada@x.com");
        assert!(auth.has_authority("ROLE_ADMIN"));
        assert!(!auth.has_authority("ROLE_USER"));

        ctx.clear();
        assert!(ctx.principal().is_none());
    }
}
