//! Authentication Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use crate::error::AuthError;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Seven days, the lifetime of a login session
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Authentication configuration loaded from environment
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret key for signing session tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Issuer claim stamped into and required on every token (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// Session lifetime in seconds (from SESSION_TTL_SECS env var)
    pub session_ttl: i64,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Upper bound on any single repository call (from REPOSITORY_TIMEOUT_SECS env var)
    pub repository_timeout: Duration,

    /// Upper bound on a single hash or verify (from HASH_TIMEOUT_SECS env var)
    pub hash_timeout: Duration,

    /// Cookie domain, if the session cookie is scoped to one (from COOKIE_DOMAIN env var)
    pub cookie_domain: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("session_ttl", &self.session_ttl)
            .field("argon2_memory_cost", &self.argon2_memory_cost)
            .field("argon2_time_cost", &self.argon2_time_cost)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .field("repository_timeout", &self.repository_timeout)
            .field("hash_timeout", &self.hash_timeout)
            .field("cookie_domain", &self.cookie_domain)
            .finish()
    }
}

impl AuthConfig {
    /// Create a configuration with default tuning around the given secret
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            jwt_issuer: "campus-auth".to_string(),
            session_ttl: DEFAULT_SESSION_TTL_SECS,
            argon2_memory_cost: 19456, // 19 MiB
            argon2_time_cost: 2,
            argon2_parallelism: 1,
            repository_timeout: Duration::from_secs(5),
            hash_timeout: Duration::from_secs(10),
            cookie_domain: None,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AuthError::Config("JWT_SECRET must be set".to_string()))?;

        let defaults = Self::with_secret(jwt_secret);

        Ok(Self {
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt_issuer.clone()),
            session_ttl: parse_var("SESSION_TTL_SECS", defaults.session_ttl)?,
            argon2_memory_cost: parse_var("ARGON2_MEMORY_COST", defaults.argon2_memory_cost)?,
            argon2_time_cost: parse_var("ARGON2_TIME_COST", defaults.argon2_time_cost)?,
            argon2_parallelism: parse_var("ARGON2_PARALLELISM", defaults.argon2_parallelism)?,
            repository_timeout: Duration::from_secs(parse_var(
                "REPOSITORY_TIMEOUT_SECS",
                defaults.repository_timeout.as_secs(),
            )?),
            hash_timeout: Duration::from_secs(parse_var(
                "HASH_TIMEOUT_SECS",
                defaults.hash_timeout.as_secs(),
            )?),
            cookie_domain: env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty()),
            ..defaults
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if self.session_ttl <= 0 {
            return Err(AuthError::Config(
                "SESSION_TTL_SECS must be positive".to_string(),
            ));
        }

        if self.repository_timeout.is_zero() {
            return Err(AuthError::Config(
                "REPOSITORY_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        if self.hash_timeout.is_zero() {
            return Err(AuthError::Config(
                "HASH_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        if self.argon2_time_cost == 0 || self.argon2_parallelism == 0 {
            return Err(AuthError::Config(
                "ARGON2_TIME_COST and ARGON2_PARALLELISM must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Process-level settings for the HTTP server binary
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (from BIND_ADDR env var)
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection string (from DATABASE_URL env var)
    pub database_url: Option<String>,

    /// Browser origin allowed to send credentialed requests (from CLIENT_ORIGIN env var)
    pub client_origin: Option<String>,
}

impl ServerConfig {
    /// Load server settings from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        Ok(Self {
            bind_addr: parse_var("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 5000)))?,
            database_url: env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()),
            client_origin: env::var("CLIENT_ORIGIN").ok().filter(|o| !o.is_empty()),
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AuthError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AuthError::Config(format!("{} has an invalid value", name))),
        Err(_) => Ok(default),
    }
}
