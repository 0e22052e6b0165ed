//! End-to-end session lifecycle through the HTTP router

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use campus_auth::{
    create_routes, AuthConfig, AuthService, MemoryUserRepository, NewUser, RepositoryError,
    TokenCodec, User, UserRepository,
};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const ALICE: &str =
    r#"{"username":"alice","email":"a@x.com","password":"pw123456","college":"MIT"}"#;

fn test_config() -> AuthConfig {
    AuthConfig {
        argon2_memory_cost: 4096,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..AuthConfig::with_secret("integration-secret-integration-secret")
    }
}

fn app_with(repo: Arc<MemoryUserRepository>) -> Router {
    let auth = AuthService::new(repo, test_config()).unwrap();
    create_routes(Arc::new(auth))
}

fn app() -> Router {
    app_with(Arc::new(MemoryUserRepository::new()))
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    /// `name=value` pair a browser would send back for the first Set-Cookie
    fn cookie_pair(&self) -> String {
        self.set_cookies()[0].split(';').next().unwrap().to_string()
    }

    fn assert_no_cache(&self) {
        assert_eq!(
            self.headers[header::CACHE_CONTROL],
            "no-store, no-cache, must-revalidate, proxy-revalidate"
        );
        assert_eq!(self.headers[header::PRAGMA], "no-cache");
        assert_eq!(self.headers[header::EXPIRES], "0");
    }
}

async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    Reply { status, headers, body }
}

async fn post_json(app: &Router, uri: &str, body: &str) -> Reply {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Reply {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

async fn login_alice(app: &Router) -> Reply {
    post_json(
        app,
        "/api/auth/login",
        r#"{"username":"alice","password":"pw123456"}"#,
    )
    .await
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let app = app();

    let registered = post_json(&app, "/api/auth/register", ALICE).await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.json(), serde_json::json!({"message": "Registered"}));
    assert!(registered.set_cookies().is_empty(), "registration must not log in");

    let logged_in = login_alice(&app).await;
    assert_eq!(logged_in.status, StatusCode::OK);
    assert_eq!(logged_in.json(), serde_json::json!({"message": "Logged in"}));
    logged_in.assert_no_cache();

    let set_cookie = &logged_in.set_cookies()[0];
    for attr in ["HttpOnly", "Secure", "SameSite=None", "Path=/", "Max-Age=604800"] {
        assert!(set_cookie.contains(attr), "missing {} in {}", attr, set_cookie);
    }
    let cookie = logged_in.cookie_pair();
    assert!(cookie.starts_with("token="));

    let me = get(&app, "/api/auth/user", Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(
        me.json(),
        serde_json::json!({"username": "alice", "college": "MIT"})
    );
    me.assert_no_cache();

    let logged_out = get(&app, "/api/auth/logout", Some(&cookie)).await;
    assert_eq!(logged_out.status, StatusCode::OK);
    assert_eq!(logged_out.json(), serde_json::json!({"message": "Logged out"}));
    logged_out.assert_no_cache();

    let cleared = logged_out.set_cookies();
    assert_eq!(cleared.len(), 2);
    for c in &cleared {
        assert!(c.starts_with("token=;"));
    }

    let after = get(&app, "/api/auth/user", Some(&logged_out.cookie_pair())).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_requires_a_session() {
    let app = app();

    let reply = get(&app, "/api/auth/user", None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json(), serde_json::json!({"message": "Not authenticated"}));
}

#[tokio::test]
async fn test_tampered_cookie_is_rejected() {
    let app = app();
    post_json(&app, "/api/auth/register", ALICE).await;
    let mut cookie = login_alice(&app).await.cookie_pair();

    let last = cookie.pop().unwrap();
    cookie.push(if last == 'A' { 'B' } else { 'A' });

    let reply = get(&app, "/api/auth/user", Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_from_another_deployment_is_rejected() {
    let app = app();
    post_json(&app, "/api/auth/register", ALICE).await;
    let cookie = login_alice(&app).await.cookie_pair();

    let other = AuthService::new(
        Arc::new(MemoryUserRepository::new()),
        AuthConfig {
            jwt_secret: "a-completely-different-signing-secret".into(),
            ..test_config()
        },
    )
    .unwrap();
    let other_app = create_routes(Arc::new(other));

    let reply = get(&other_app, "/api/auth/user", Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = app();
    post_json(&app, "/api/auth/register", ALICE).await;

    let wrong_password = post_json(
        &app,
        "/api/auth/login",
        r#"{"username":"alice","password":"wrong"}"#,
    )
    .await;
    let unknown_user = post_json(
        &app,
        "/api/auth/login",
        r#"{"username":"nobody","password":"pw123456"}"#,
    )
    .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status, unknown_user.status);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(
        wrong_password.json(),
        serde_json::json!({"message": "Invalid credentials"})
    );
    assert!(wrong_password.set_cookies().is_empty());
}

#[tokio::test]
async fn test_duplicate_registration() {
    let app = app();
    post_json(&app, "/api/auth/register", ALICE).await;

    let same_username = post_json(
        &app,
        "/api/auth/register",
        r#"{"username":"alice","email":"other@x.com","password":"x","college":"CMU"}"#,
    )
    .await;
    let same_email = post_json(
        &app,
        "/api/auth/register",
        r#"{"username":"bob","email":"a@x.com","password":"x","college":"CMU"}"#,
    )
    .await;

    for reply in [same_username, same_email] {
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            reply.json(),
            serde_json::json!({"message": "Username or email already taken"})
        );
    }
}

#[tokio::test]
async fn test_missing_fields() {
    let app = app();

    let cases = [
        ("/api/auth/register", r#"{"username":"alice","email":"a@x.com","password":"pw"}"#),
        ("/api/auth/register", r#"{"username":"","email":"a@x.com","password":"pw","college":"MIT"}"#),
        ("/api/auth/login", r#"{"username":"alice"}"#),
        ("/api/auth/login", r#"{"username":"alice","password":""}"#),
        ("/api/auth/login", "not json"),
    ];

    for (uri, body) in cases {
        let reply = post_json(&app, uri, body).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
        assert_eq!(reply.json(), serde_json::json!({"message": "Missing fields"}));
    }
}

#[tokio::test]
async fn test_deleted_user_session_is_not_found() {
    let repo = Arc::new(MemoryUserRepository::new());
    let app = app_with(repo.clone());
    post_json(&app, "/api/auth/register", ALICE).await;
    let cookie = login_alice(&app).await.cookie_pair();

    let user = repo.find_by_username("alice").await.unwrap().unwrap();
    assert!(repo.remove(user.id).await);

    let reply = get(&app, "/api/auth/user", Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert!(reply.body.is_empty());
}

struct UnavailableRepository;

#[async_trait]
impl UserRepository for UnavailableRepository {
    async fn find_by_username(&self, _: &str) -> Result<Option<User>, RepositoryError> {
        Err(RepositoryError::Backend("down".into()))
    }

    async fn find_by_id(&self, _: Uuid) -> Result<Option<User>, RepositoryError> {
        Err(RepositoryError::Backend("down".into()))
    }

    async fn create(&self, _: NewUser) -> Result<User, RepositoryError> {
        Err(RepositoryError::Backend("down".into()))
    }
}

#[tokio::test]
async fn test_backend_outage_responses() {
    let auth = AuthService::new(Arc::new(UnavailableRepository), test_config()).unwrap();
    let app = create_routes(Arc::new(auth));

    let login = login_alice(&app).await;
    assert_eq!(login.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(login.json(), serde_json::json!({"message": "Login error"}));
    assert!(login.set_cookies().is_empty());

    let register = post_json(&app, "/api/auth/register", ALICE).await;
    assert_eq!(register.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        register.json(),
        serde_json::json!({"message": "Registration error"})
    );

    let token = TokenCodec::from_config(&test_config())
        .sign(Uuid::new_v4(), chrono::Utc::now())
        .unwrap();
    let me = get(&app, "/api/auth/user", Some(&format!("token={}", token))).await;
    assert_eq!(me.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(me.body.is_empty());
}

#[tokio::test]
async fn test_logout_without_session_still_succeeds() {
    let app = app();

    let reply = get(&app, "/api/auth/logout", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.set_cookies().len(), 2);
    reply.assert_no_cache();

    let again = get(&app, "/api/auth/logout", Some("token=garbage")).await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let reply = get(&app(), "/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, b"OK");
}
