//! Authentication Extractors
//!
//! Axum extractors for session resolution and request metadata.

use crate::cookie::SessionCookie;
use crate::error::AuthError;
use crate::handlers::AuthState;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use chrono::Utc;
use std::convert::Infallible;
use tracing::Span;
use uuid::Uuid;

/// User id of a valid session, resolved from the `token` cookie
///
/// Rejects with 401 when the cookie is absent, empty, tampered with or
/// expired. Whether the user still exists is left to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthState::from_ref(state);
        let token = SessionCookie::read(&parts.headers);

        auth.resolve_session(token.as_deref(), Utc::now())
            .map(SessionUser)
    }
}

/// Where a request came from, as reported by the proxy in front of us
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip = header_str(headers, "x-forwarded-for")
            .and_then(|chain| chain.split(',').next())
            .or_else(|| header_str(headers, "x-real-ip"))
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(String::from);

        Self {
            ip,
            user_agent: header_str(headers, header::USER_AGENT.as_str()).map(String::from),
        }
    }

    /// Span that tags login events with the caller's address and agent
    pub fn login_span(&self) -> Span {
        tracing::info_span!(
            "login",
            ip = self.ip.as_deref().unwrap_or("-"),
            user_agent = self.user_agent.as_deref().unwrap_or("-")
        )
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
