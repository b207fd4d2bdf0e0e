/*
 * Responsibility
 * - v1 URL structure
 * - The route policy table for the same URLs (kept here so the two stay in sync)
 */
use axum::{
    Router,
    http::Method,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{authenticate, register},
    health::health,
    users::{admin_check, me, user_check},
};
use crate::services::auth::policy::{AuthorizationPolicy, MethodPattern, RoutePolicyEntry};
use crate::state::AppState;

pub const PREFIX: &str = "/api/v1";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/authenticate", post(authenticate))
        .route("/users/user/check", get(user_check))
        .route("/users/admin/check", get(admin_check))
        .route("/users/me", get(me))
}

/// Evaluated top to bottom, first match wins. Anything not listed needs a principal.
pub fn policy() -> AuthorizationPolicy {
    let path = |p: &str| format!("{PREFIX}{p}");

    AuthorizationPolicy::new(vec![
        RoutePolicyEntry::public(MethodPattern::Exact(Method::POST), &path("/auth/**")),
        RoutePolicyEntry::public(MethodPattern::Exact(Method::GET), &path("/health")),
        RoutePolicyEntry::any_of(
            MethodPattern::Exact(Method::GET),
            &path("/users/user/**"),
            ["USER", "ADMIN"],
        ),
        RoutePolicyEntry::any_of(
            MethodPattern::Exact(Method::GET),
            &path("/users/admin/**"),
            ["ADMIN"],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::app::{assemble_state, build_router};
    use crate::middleware::http::{HttpLimits, REQUEST_ID_HEADER};
    use crate::repos::memory_user_store::InMemoryUserStore;
    use crate::repos::user_store::UserStore;
    use crate::services::auth::TokenService;
    use crate::services::auth::password::{BcryptPasswordVerifier, PasswordVerifier};
    use crate::services::auth::principal::{NewPrincipal, Principal, Role};
    use crate::services::clock::ManualClock;

    struct TestApp {
        router: axum::Router,
        store: Arc<InMemoryUserStore>,
        tokens: Arc<TokenService>,
        clock: Arc<ManualClock>,
    }

    impl TestApp {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::starting_now());
            let tokens = Arc::new(
                TokenService::new(&[42u8; 32], Duration::from_secs(60), clock.clone()).unwrap(),
            );
            let store = Arc::new(InMemoryUserStore::new());
            let state = assemble_state(
                store.clone(),
                tokens.clone(),
                Arc::new(BcryptPasswordVerifier::new(4)),
            )
            .unwrap();

            Self {
                router: build_router(state, HttpLimits::default()),
                store,
                tokens,
                clock,
            }
        }

        async fn seed(&self, email: &str, password: &str, role: Role) -> Principal {
            let password_hash = BcryptPasswordVerifier::new(4).hash(password).unwrap();
            self.store
                .create(NewPrincipal {
                    firstname: Some("Test".to_string()),
                    lastname: None,
                    email: email.to_string(),
                    password_hash,
                    role,
                })
                .await
                .unwrap()
        }

        fn token_for(&self, principal: &Principal) -> String {
            self.tokens.generate_token(principal).unwrap().into_string()
        }

        async fn send(&self, req: Request<Body>) -> Response {
            self.router.clone().oneshot(req).await.unwrap()
        }
    }

    fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn json_body(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new();

        let res = app.send(get("/api/v1/health", None)).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let app = TestApp::new();

        let res = app.send(get("/api/v1/health", None)).await;
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn register_then_use_the_token() {
        let app = TestApp::new();

        let res = app
            .send(post_json(
                "/api/v1/auth/register",
                json!({"firstname": "Ada", "email": "ada@x.com", "password": "s3cret"}),
            ))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let token = json_body(res).await["token"].as_str().unwrap().to_string();

        let res = app.send(get("/api/v1/users/me", Some(&token))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let profile = json_body(res).await;
        assert_eq!(profile["email"], "ada@x.com");
        assert_eq!(profile["firstname"], "Ada");
        assert_eq!(profile["role"], "USER");
        assert!(profile.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn authenticate_issues_a_token_for_valid_credentials() {
        let app = TestApp::new();
        app.seed("a@x.com", "right", Role::User).await;

        let res = app
            .send(post_json(
                "/api/v1/auth/authenticate",
                json!({"email": "a@x.com", "password": "right"}),
            ))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let token = json_body(res).await["token"].as_str().unwrap().to_string();
        assert_eq!(app.tokens.extract_username(&token).unwrap(), "a@x.com");

        let res = app.send(get("/api/v1/users/user/check", Some(&token))).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(text(res).await, "Welcome, USER! You have user-level access.");
    }

    #[tokio::test]
    async fn wrong_password_is_a_json_401() {
        let app = TestApp::new();
        app.seed("a@x.com", "right", Role::User).await;

        let res = app
            .send(post_json(
                "/api/v1/auth/authenticate",
                json!({"email": "a@x.com", "password": "wrong"}),
            ))
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(res).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert!(body.get("token").is_none());
    }

    #[tokio::test]
    async fn blank_email_is_a_bad_request() {
        let app = TestApp::new();

        let res = app
            .send(post_json(
                "/api/v1/auth/register",
                json!({"email": " ", "password": "pw"}),
            ))
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn malformed_json_gets_the_error_envelope() {
        let app = TestApp::new();

        for uri in ["/api/v1/auth/register", "/api/v1/auth/authenticate"] {
            let req = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"email\": "))
                .unwrap();

            let res = app.send(req).await;

            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            let body = json_body(res).await;
            assert_eq!(body["error"]["code"], "BAD_REQUEST");
            assert!(body["error"]["message"].as_str().unwrap().starts_with("invalid request:"));
        }
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let app = TestApp::new();
        app.seed("a@x.com", "pw", Role::User).await;

        let res = app
            .send(post_json(
                "/api/v1/auth/register",
                json!({"email": "a@x.com", "password": "other"}),
            ))
            .await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_header_reaches_authorization_unauthenticated() {
        let app = TestApp::new();

        let res = app.send(get("/api/v1/users/user/check", None)).await;

        // JSON body = denied by the policy, not aborted by the interceptor
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn garbage_token_is_aborted_with_invalid_token() {
        let app = TestApp::new();

        let res = app.send(get("/api/v1/users/user/check", Some("garbage"))).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(text(res).await, "Invalid token");
    }

    #[tokio::test]
    async fn garbage_token_is_aborted_even_on_public_routes() {
        let app = TestApp::new();

        let res = app.send(get("/api/v1/health", Some("not-a-real-token"))).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(text(res).await, "Invalid token");
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let app = TestApp::new();
        let user = app.seed("u1@x.com", "pw", Role::User).await;
        let token = app.token_for(&user);

        assert_eq!(app.tokens.extract_username(&token).unwrap(), "u1@x.com");

        app.clock.advance(chrono::Duration::seconds(61));
        assert!(!app.tokens.is_valid_token(&token, &user));

        let res = app.send(get("/api/v1/users/user/check", Some(&token))).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(text(res).await, "Token is expired");
    }

    #[tokio::test]
    async fn token_for_unknown_principal_fails_authentication() {
        let app = TestApp::new();
        let ghost = Principal {
            id: uuid::Uuid::new_v4(),
            firstname: None,
            lastname: None,
            email: "ghost@x.com".to_string(),
            password_hash: String::new(),
            role: Role::Admin,
        };
        let token = app.token_for(&ghost);

        let res = app.send(get("/api/v1/users/admin/check", Some(&token))).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(text(res).await, "Authentication failed");
    }

    #[tokio::test]
    async fn admin_route_forbids_users_and_admits_admins() {
        let app = TestApp::new();
        let user = app.seed("user@x.com", "pw", Role::User).await;
        let admin = app.seed("admin@x.com", "pw", Role::Admin).await;

        let res = app
            .send(get("/api/v1/users/admin/check", Some(&app.token_for(&user))))
            .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(res).await["error"]["code"], "FORBIDDEN");

        let res = app
            .send(get("/api/v1/users/admin/check", Some(&app.token_for(&admin))))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(text(res).await, "Welcome, ADMIN! You have admin-level access.");
    }

    #[tokio::test]
    async fn user_route_admits_admins_too() {
        let app = TestApp::new();
        let admin = app.seed("admin@x.com", "pw", Role::Admin).await;

        let res = app
            .send(get("/api/v1/users/user/check", Some(&app.token_for(&admin))))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unlisted_route_requires_a_principal() {
        let app = TestApp::new();
        let user = app.seed("user@x.com", "pw", Role::User).await;

        let res = app.send(get("/api/v1/users/me", None)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app.send(get("/api/v1/users/me", Some(&app.token_for(&user)))).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_once_authenticated() {
        let app = TestApp::new();
        let user = app.seed("user@x.com", "pw", Role::User).await;

        let res = app.send(get("/api/v1/nope", None)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app.send(get("/api/v1/nope", Some(&app.token_for(&user)))).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(res).await["error"]["code"], "NOT_FOUND");
    }

    #[test]
    fn policy_lists_public_routes_first() {
        let policy = policy();
        let public: Vec<bool> = policy
            .entries()
            .iter()
            .map(|e| e.required_roles.is_empty())
            .collect();
        assert_eq!(public, vec![true, true, false, false]);
    }
}
