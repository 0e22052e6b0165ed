//! Authentication HTTP Handlers
//!
//! REST API endpoints for the session lifecycle.

use crate::cookie::no_cache_headers;
use crate::error::AuthError;
use crate::extractors::{ClientInfo, SessionUser};
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Instrument;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

// ============================================
// Route Builder
// ============================================

/// Create authentication routes
pub fn create_routes(auth_service: Arc<AuthService>) -> Router {
    let auth = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/user", get(get_current_user))
        .route("/logout", get(logout));

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth)
        .layer(TraceLayer::new_for_http())
        .with_state(auth_service)
}

/// CORS policy for a single browser origin that sends the session cookie
pub fn cors_layer(origin: &str) -> Result<CorsLayer, AuthError> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|_| AuthError::Config(format!("invalid CLIENT_ORIGIN: {}", origin)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

async fn health() -> &'static str {
    "OK"
}

// ============================================
// Registration
// ============================================

/// POST /api/auth/register
///
/// Create an account. The caller must log in separately.
pub async fn register(
    State(auth): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(req) = payload.map_err(|e| AuthError::Validation(e.body_text()))?;

    auth.register(req).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("Registered"))))
}

// ============================================
// Login / Logout
// ============================================

/// POST /api/auth/login
///
/// Verify credentials and start a session cookie
pub async fn login(
    State(auth): State<AuthState>,
    client: ClientInfo,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(req) = payload.map_err(|e| AuthError::Validation(e.body_text()))?;

    let session = auth.login(req).instrument(client.login_span()).await?;

    Ok((
        no_cache_headers(),
        AppendHeaders([(header::SET_COOKIE, auth.cookie().set(&session.token))]),
        Json(MessageResponse::new("Logged in")),
    ))
}

/// GET /api/auth/logout
///
/// Drop the session cookie. Succeeds whether or not a session existed.
pub async fn logout(
    State(auth): State<AuthState>,
    session: Option<SessionUser>,
) -> impl IntoResponse {
    if let Some(SessionUser(user_id)) = session {
        tracing::info!(user_id = %user_id, "User logged out");
    }

    let [clear, expired] = auth.cookie().clear();

    (
        no_cache_headers(),
        AppendHeaders([(header::SET_COOKIE, clear), (header::SET_COOKIE, expired)]),
        Json(MessageResponse::new("Logged out")),
    )
}

// ============================================
// User Profile
// ============================================

/// GET /api/auth/user
///
/// Profile of the signed-in user
pub async fn get_current_user(
    State(auth): State<AuthState>,
    SessionUser(user_id): SessionUser,
) -> Result<impl IntoResponse, AuthError> {
    let profile = auth.current_user(user_id).await?;

    Ok((no_cache_headers(), Json(profile)))
}
