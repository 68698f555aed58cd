//! Request extractors: session resolution and JSON bodies with uniform
//! 400 errors.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, USER_AGENT},
        request::Parts,
    },
};
use axum_extra::extract::CookieJar;
use homestay_auth::{AuthError, AuthenticatedSession, SessionContext};
use homestay_core::error::HomestayError;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

/// Raw session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Client address and user agent for the session row.
pub fn session_context(headers: &HeaderMap) -> SessionContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    SessionContext {
        ip_address: header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty()),
        user_agent: header(USER_AGENT.as_str()),
    }
}

/// The signed-in user. Rejects with 401 when no live session is presented.
pub struct CurrentUser(pub AuthenticatedSession);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.auth.config().cookie_name)
            .ok_or_else(|| HomestayError::from(AuthError::MissingSession))?;
        let session = state.auth.get_session(&token).await?;
        Ok(CurrentUser(session))
    }
}

/// Like [`CurrentUser`] but never rejects for a missing or stale session.
pub struct MaybeUser(pub Option<AuthenticatedSession>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers, &state.auth.config().cookie_name) else {
            return Ok(MaybeUser(None));
        };
        match state.auth.get_session(&token).await {
            Ok(session) => Ok(MaybeUser(Some(session))),
            Err(HomestayError::AuthenticationFailed { .. }) => Ok(MaybeUser(None)),
            Err(e) => Err(e.into()),
        }
    }
}

/// `Json<T>` whose rejection is a JSON 400.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// [`ApiJson`] followed by `validator` checks.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ApiJson(value) = ApiJson::<T>::from_request(req, state).await?;
        value.validate().map_err(HomestayError::from)?;
        Ok(ValidatedJson(value))
    }
}

/// Parse a path id, answering 400 for anything that is not a UUID.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id: {raw}")))
}
