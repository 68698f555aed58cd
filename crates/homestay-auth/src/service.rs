//! Authentication service: sign-up, sign-in, session lookup, sign-out
//! and permission checks.

use homestay_core::access::{self, Action, Resource, Role};
use homestay_core::error::{HomestayError, HomestayResult};
use homestay_core::models::session::{CreateSession, Session};
use homestay_core::models::user::{CreateUser, SignIn, SignUp, User};
use homestay_core::repository::{SessionRepository, UserRepository};
use chrono::{Duration, Utc};
use tracing::{debug, info};
use validator::Validate;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Client details recorded on the session row.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A session that was just opened. `token` is the raw value handed to the
/// client; it is not stored anywhere.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
    pub user: User,
}

/// A live session resolved from a presented token.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub session: Session,
    pub user: User,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: U,
    session_repo: S,
    config: AuthConfig,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(user_repo: U, session_repo: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register a `user`-role account and open its first session.
    pub async fn sign_up(
        &self,
        input: SignUp,
        ctx: SessionContext,
    ) -> HomestayResult<IssuedSession> {
        input.validate()?;
        if input.password.chars().count() < self.config.min_password_length {
            return Err(AuthError::WeakPassword(self.config.min_password_length).into());
        }

        let password_hash =
            password::hash_password(&input.password, self.config.pepper.as_deref())?;

        let user = self
            .user_repo
            .create(CreateUser {
                name: input.name,
                email: input.email,
                image: input.image,
                role: Role::User,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User signed up");
        self.open_session(user, ctx).await
    }

    /// Authenticate with email and password. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn sign_in(
        &self,
        input: SignIn,
        ctx: SessionContext,
    ) -> HomestayResult<IssuedSession> {
        input.validate()?;

        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(u) => u,
            Err(HomestayError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        debug!(user_id = %user.id, "User signed in");
        self.open_session(user, ctx).await
    }

    /// Resolve a raw session token. Expired sessions are deleted and
    /// rejected.
    pub async fn get_session(&self, raw_token: &str) -> HomestayResult<AuthenticatedSession> {
        let token_hash = token::hash_session_token(raw_token);
        let session = self
            .session_repo
            .get_by_token_hash(&token_hash)
            .await
            .map_err(|e| match e {
                HomestayError::NotFound { .. } => AuthError::MissingSession.into(),
                other => other,
            })?;

        if session.is_expired() {
            self.session_repo.invalidate(session.id).await?;
            return Err(AuthError::SessionExpired.into());
        }

        let user = match self.user_repo.get_by_id(session.user_id).await {
            Ok(u) => u,
            Err(HomestayError::NotFound { .. }) => {
                self.session_repo.invalidate(session.id).await?;
                return Err(AuthError::MissingSession.into());
            }
            Err(e) => return Err(e),
        };

        Ok(AuthenticatedSession { session, user })
    }

    /// Invalidate the session behind `raw_token`. Unknown tokens are a
    /// no-op.
    pub async fn sign_out(&self, raw_token: &str) -> HomestayResult<()> {
        let token_hash = token::hash_session_token(raw_token);
        match self.session_repo.get_by_token_hash(&token_hash).await {
            Ok(session) => self.session_repo.invalidate(session.id).await,
            Err(HomestayError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Purge expired sessions, returning how many were removed.
    pub async fn cleanup_expired_sessions(&self) -> HomestayResult<u64> {
        self.session_repo.cleanup_expired().await
    }

    async fn open_session(&self, user: User, ctx: SessionContext) -> HomestayResult<IssuedSession> {
        let raw = token::generate_session_token();
        let expires_at = Utc::now() + Duration::seconds(self.config.session_lifetime_secs as i64);

        let session = self
            .session_repo
            .create(CreateSession {
                user_id: user.id,
                token_hash: token::hash_session_token(&raw),
                ip_address: ctx.ip_address,
                user_agent: ctx.user_agent,
                expires_at,
            })
            .await?;

        Ok(IssuedSession {
            token: raw,
            session,
            user,
        })
    }
}

/// Fail with `AuthorizationDenied` unless `user` holds every action on
/// `resource`.
pub fn authorize(user: &User, resource: Resource, actions: &[Action]) -> HomestayResult<()> {
    if access::has_permission(user.role, resource, actions) {
        return Ok(());
    }
    let wanted = actions
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(",");
    Err(AuthError::Forbidden(format!("{}:{wanted}", resource.as_str())).into())
}

/// Fail with `AuthorizationDenied` unless `user` is a superUser or
/// superAdmin.
pub fn require_moderator(user: &User) -> HomestayResult<()> {
    if user.role.is_moderator() {
        Ok(())
    } else {
        Err(AuthError::Forbidden("moderator role".into()).into())
    }
}

pub fn require_role(user: &User, role: Role) -> HomestayResult<()> {
    if user.role == role {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!("{} role", role.as_str())).into())
    }
}
