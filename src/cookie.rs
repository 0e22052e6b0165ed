//! Session Cookie Transport
//!
//! Builds the `Set-Cookie` values that carry the session token and reads
//! it back from incoming `Cookie` headers. Browsers only drop a cookie
//! when the clearing header repeats the attributes it was set with, so
//! set and clear share one attribute string.

use axum::http::{header, HeaderMap, HeaderName};

use crate::config::AuthConfig;

/// Cookie name carrying the session token
pub const SESSION_COOKIE_NAME: &str = "token";

const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Response headers that keep session-bearing responses out of caches
pub fn no_cache_headers() -> [(HeaderName, &'static str); 3] {
    [
        (
            header::CACHE_CONTROL,
            "no-store, no-cache, must-revalidate, proxy-revalidate",
        ),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
    ]
}

#[derive(Debug, Clone)]
pub struct SessionCookie {
    max_age: i64,
    domain: Option<String>,
}

impl SessionCookie {
    pub fn new(max_age: i64, domain: Option<String>) -> Self {
        Self { max_age, domain }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.session_ttl, config.cookie_domain.clone())
    }

    fn attributes(&self) -> String {
        let mut attrs = String::from("Path=/; HttpOnly; Secure; SameSite=None");
        if let Some(domain) = &self.domain {
            attrs.push_str("; Domain=");
            attrs.push_str(domain);
        }
        attrs
    }

    /// `Set-Cookie` value establishing a session
    pub fn set(&self, token: &str) -> String {
        format!(
            "{}={}; Max-Age={}; {}",
            SESSION_COOKIE_NAME,
            token,
            self.max_age,
            self.attributes()
        )
    }

    /// `Set-Cookie` values ending a session: a clear, then an
    /// already-expired empty replacement
    pub fn clear(&self) -> [String; 2] {
        let attrs = self.attributes();
        [
            format!("{}=; Max-Age=0; {}", SESSION_COOKIE_NAME, attrs),
            format!("{}=; Expires={}; {}", SESSION_COOKIE_NAME, EPOCH, attrs),
        ]
    }

    /// Session token from the request's `Cookie` headers, if any
    pub fn read(headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE_NAME)
            .map(|(_, value)| value.trim().to_string())
    }
}
