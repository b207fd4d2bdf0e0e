/*
 * Responsibility
 * - Route table (method + path pattern -> required roles) and the decision over it
 * - Pure: no I/O, no request types beyond Method / path, so it is testable on its own
 *
 * Rules
 * - Entries are evaluated in order, first match wins (register specific patterns first)
 * - Empty required roles = public route
 * - Otherwise ANY-of: role R is satisfied by authority "ROLE_R"; roles are flat (ADMIN does not imply USER)
 * - No matching entry = any authenticated principal
 */
use std::collections::BTreeSet;

use axum::http::Method;

use crate::services::auth::context::SecurityContext;
use crate::services::auth::principal::AUTHORITY_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    // no principal in the context -> 401
    Unauthenticated,
    // principal present but without a required role -> 403
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodPattern {
    Any,
    Exact(Method),
}

impl MethodPattern {
    fn matches(&self, method: &Method) -> bool {
        match self {
            MethodPattern::Any => true,
            MethodPattern::Exact(m) => m == method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    // `*`
    One,
    // `**`
    Rest,
}

/// Ant-style path pattern: `/api/v1/users/*/check`, `/api/v1/auth/**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| match s {
                "**" => Segment::Rest,
                "*" => Segment::One,
                literal => Segment::Literal(literal.to_string()),
            })
            .collect();
        Self { segments }
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_path(path).collect();
        match_segments(&self.segments, &parts)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Rest, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((Segment::One, rest)) => !path.is_empty() && match_segments(rest, &path[1..]),
        Some((Segment::Literal(lit), rest)) => {
            path.first().is_some_and(|p| p == lit) && match_segments(rest, &path[1..])
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoutePolicyEntry {
    pub method: MethodPattern,
    pub path: PathPattern,
    // role names without the ROLE_ prefix; empty = public
    pub required_roles: BTreeSet<String>,
}

impl RoutePolicyEntry {
    pub fn public(method: MethodPattern, path: &str) -> Self {
        Self {
            method,
            path: PathPattern::parse(path),
            required_roles: BTreeSet::new(),
        }
    }

    pub fn any_of<I, S>(method: MethodPattern, path: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path: PathPattern::parse(path),
            required_roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.matches(method) && self.path.matches(path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    entries: Vec<RoutePolicyEntry>,
}

impl AuthorizationPolicy {
    pub fn new(entries: Vec<RoutePolicyEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RoutePolicyEntry] {
        &self.entries
    }

    pub fn allow(&self, method: &Method, path: &str, ctx: &SecurityContext) -> Decision {
        let entry = self.entries.iter().find(|e| e.matches(method, path));

        match entry {
            Some(entry) if entry.required_roles.is_empty() => Decision::Allow,
            Some(entry) => match ctx.get() {
                None => Decision::Deny(DenyReason::Unauthenticated),
                Some(auth) => {
                    let granted = entry.required_roles.iter().any(|role| {
                        auth.has_authority(&format!("{AUTHORITY_PREFIX}{role}"))
                    });
                    if granted {
                        Decision::Allow
                    } else {
                        Decision::Deny(DenyReason::Forbidden)
                    }
                }
            },
            None if ctx.is_authenticated() => Decision::Allow,
            None => Decision::Deny(DenyReason::Unauthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::principal::{Principal, Role};
    use uuid::Uuid;

    fn ctx_with(role: Role) -> SecurityContext {
        let mut ctx = SecurityContext::new();
        ctx.set(Principal {
            id: Uuid::new_v4(),
            firstname: None,
            lastname: None,
            email: "p@x.com".to_string(),
            password_hash: String::new(),
            role,
        });
        ctx
    }

    fn table() -> AuthorizationPolicy {
        AuthorizationPolicy::new(vec![
            RoutePolicyEntry::public(MethodPattern::Exact(Method::POST), "/auth/**"),
            RoutePolicyEntry::any_of(
                MethodPattern::Exact(Method::GET),
                "/users/user/**",
                ["USER", "ADMIN"],
            ),
            RoutePolicyEntry::any_of(MethodPattern::Exact(Method::GET), "/users/admin/**", ["ADMIN"]),
        ])
    }

    #[test]
    fn path_patterns() {
        let p = PathPattern::parse("/auth/**");
        assert!(p.matches("/auth"));
        assert!(p.matches("/auth/register"));
        assert!(p.matches("/auth/a/b/c"));
        assert!(!p.matches("/authx/register"));

        let p = PathPattern::parse("/users/*/check");
        assert!(p.matches("/users/admin/check"));
        assert!(p.matches("/users/admin/check/"));
        assert!(!p.matches("/users/check"));
        assert!(!p.matches("/users/a/b/check"));

        let p = PathPattern::parse("/a/**/z");
        assert!(p.matches("/a/z"));
        assert!(p.matches("/a/b/c/z"));
        assert!(!p.matches("/a/b/c"));
    }

    #[test]
    fn public_route_ignores_the_context() {
        let policy = table();
        assert_eq!(
            policy.allow(&Method::POST, "/auth/register", &SecurityContext::new()),
            Decision::Allow
        );
        // method is part of the match: GET falls through to the default rule
        assert_eq!(
            policy.allow(&Method::GET, "/auth/register", &SecurityContext::new()),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn admin_route_distinguishes_401_from_403() {
        let policy = table();
        assert_eq!(
            policy.allow(&Method::GET, "/users/admin/check", &SecurityContext::new()),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            policy.allow(&Method::GET, "/users/admin/check", &ctx_with(Role::User)),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(
            policy.allow(&Method::GET, "/users/admin/check", &ctx_with(Role::Admin)),
            Decision::Allow
        );
    }

    #[test]
    fn any_of_roles() {
        let policy = table();
        assert_eq!(
            policy.allow(&Method::GET, "/users/user/check", &ctx_with(Role::User)),
            Decision::Allow
        );
        assert_eq!(
            policy.allow(&Method::GET, "/users/user/check", &ctx_with(Role::Admin)),
            Decision::Allow
        );
    }

    #[test]
    fn unlisted_route_needs_any_principal() {
        let policy = table();
        assert_eq!(
            policy.allow(&Method::DELETE, "/anything", &SecurityContext::new()),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            policy.allow(&Method::DELETE, "/anything", &ctx_with(Role::User)),
            Decision::Allow
        );
    }

    #[test]
    fn first_match_wins() {
        let policy = AuthorizationPolicy::new(vec![
            RoutePolicyEntry::public(MethodPattern::Any, "/docs/public/**"),
            RoutePolicyEntry::any_of(MethodPattern::Any, "/docs/**", ["ADMIN"]),
        ]);
        assert_eq!(
            policy.allow(&Method::GET, "/docs/public/index", &SecurityContext::new()),
            Decision::Allow
        );
        assert_eq!(
            policy.allow(&Method::GET, "/docs/private", &ctx_with(Role::User)),
            Decision::Deny(DenyReason::Forbidden)
        );

        let reversed = AuthorizationPolicy::new(policy.entries().iter().rev().cloned().collect());
        assert_eq!(
            reversed.allow(&Method::GET, "/docs/public/index", &SecurityContext::new()),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }
}
