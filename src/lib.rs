//! Campus Auth
//!
//! Cookie-based authentication for a campus web application:
//! - Username/password registration with college profile
//! - Argon2id password hashing
//! - Signed, self-contained session tokens (HS256 JWT, 7 day lifetime)
//! - `token` cookie transport with no-cache responses
//! - Stateless logout by cookie clearing
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing session tokens (required, min 32 chars)
//! - `JWT_ISSUER` - Issuer claim (default: "campus-auth")
//! - `SESSION_TTL_SECS` - Session lifetime in seconds (default: 604800)
//! - `ARGON2_MEMORY_COST` / `ARGON2_TIME_COST` / `ARGON2_PARALLELISM` - hashing cost
//! - `REPOSITORY_TIMEOUT_SECS` - Bound on each repository call (default: 5)
//! - `HASH_TIMEOUT_SECS` - Bound on each password hash or verify (default: 10)
//! - `COOKIE_DOMAIN` - Optional cookie domain
//! - `DATABASE_URL` - PostgreSQL connection string (in-memory store when unset)
//! - `BIND_ADDR` / `CLIENT_ORIGIN` - Server listen address and CORS origin
//!
//! # Usage
//!
//! ```rust,ignore
//! use campus_auth::{create_routes, AuthConfig, AuthService, MemoryUserRepository};
//!
//! let config = AuthConfig::from_env()?;
//! config.validate()?;
//!
//! let auth = AuthService::new(Arc::new(MemoryUserRepository::new()), config)?;
//! let app = create_routes(Arc::new(auth));
//! ```

pub mod config;
pub mod cookie;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use config::{AuthConfig, ServerConfig};
pub use cookie::{SessionCookie, SESSION_COOKIE_NAME};
pub use error::AuthError;
pub use extractors::{ClientInfo, SessionUser};
pub use handlers::{cors_layer, create_routes, AuthState};
pub use models::*;
pub use password::{PasswordError, PasswordHasher};
pub use repository::{MemoryUserRepository, PgUserRepository, RepositoryError, UserRepository};
pub use service::{AuthService, LoginSession};
pub use token::{TokenCodec, TokenError};
