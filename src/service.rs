//! Authentication Service
//!
//! Core session lifecycle: registration, login, session resolution and
//! current-user lookup. Sessions live entirely in the signed token; the
//! service keeps no per-session state.

use crate::config::AuthConfig;
use crate::cookie::SessionCookie;
use crate::error::AuthError;
use crate::models::*;
use crate::password::{PasswordError, PasswordHasher};
use crate::repository::{RepositoryError, UserRepository};
use crate::token::TokenCodec;

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// A freshly issued session
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    config: AuthConfig,
    hasher: PasswordHasher,
    tokens: TokenCodec,
    cookie: SessionCookie,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(users: Arc<dyn UserRepository>, config: AuthConfig) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::from_config(&config)
            .map_err(|e| AuthError::Config(e.to_string()))?;
        let tokens = TokenCodec::from_config(&config);
        let cookie = SessionCookie::from_config(&config);

        Ok(Self {
            users,
            config,
            hasher,
            tokens,
            cookie,
        })
    }

    /// Cookie transport for the session token
    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        tokio::time::timeout(self.config.repository_timeout, call)
            .await
            .map_err(|_| RepositoryError::Timeout)?
    }

    async fn bounded_hash<T, F>(&self, call: F) -> Result<T, PasswordError>
    where
        F: Future<Output = Result<T, PasswordError>>,
    {
        tokio::time::timeout(self.config.hash_timeout, call)
            .await
            .map_err(|_| PasswordError::Timeout)?
    }

    // ============================================
    // User Registration
    // ============================================

    /// Register a new user. Does not start a session.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let password_hash = self
            .bounded_hash(self.hasher.hash_async(req.password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to hash password");
                AuthError::Registration
            })?;

        let new_user = NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            college: req.college,
        };

        let user = match self.bounded(self.users.create(new_user)).await {
            Ok(user) => user,
            Err(RepositoryError::Duplicate) => return Err(AuthError::Conflict),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create user");
                return Err(AuthError::Registration);
            }
        };

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    // ============================================
    // Login
    // ============================================

    /// Attempt to login a user
    pub async fn login(&self, req: LoginRequest) -> Result<LoginSession, AuthError> {
        self.login_at(req, Utc::now()).await
    }

    /// Login with an explicit issue time
    pub async fn login_at(
        &self,
        req: LoginRequest,
        now: DateTime<Utc>,
    ) -> Result<LoginSession, AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let user = self
            .bounded(self.users.find_by_username(&req.username))
            .await
            .map_err(|e| login_fault("look up user", e))?;

        let Some(user) = user else {
            tracing::warn!("Login failed: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .bounded_hash(
                self.hasher
                    .verify_async(req.password, user.password_hash.clone()),
            )
            .await
            .map_err(|e| login_fault("verify password", e))?;

        if !matches {
            tracing::warn!(user_id = %user.id, "Login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .sign(user.id, now)
            .map_err(|e| login_fault("sign session token", e))?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginSession {
            user_id: user.id,
            token,
            expires_at: now + self.tokens.ttl(),
        })
    }

    // ============================================
    // Session Resolution
    // ============================================

    /// Turn a presented session token into the user id it was issued for
    pub fn resolve_session(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Uuid, AuthError> {
        match token {
            Some(token) if !token.is_empty() => Ok(self.tokens.verify(token, now)?),
            _ => Err(AuthError::Unauthenticated),
        }
    }

    /// Public profile of the user a session resolved to
    pub async fn current_user(&self, user_id: Uuid) -> Result<CurrentUserResponse, AuthError> {
        let user = self
            .bounded(self.users.find_by_id(user_id))
            .await?
            .ok_or_else(|| {
                tracing::info!(user_id = %user_id, "Session refers to a missing user");
                AuthError::NotFound
            })?;

        Ok(CurrentUserResponse::from(user))
    }
}

fn login_fault(step: &str, err: impl std::fmt::Display) -> AuthError {
    tracing::error!(error = %err, "Login failed to {}", step);
    AuthError::LoginFault
}
