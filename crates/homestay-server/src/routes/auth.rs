//! Email/password authentication endpoints.
//!
//! Sign-up and sign-in answer with the raw session token in the body and
//! in an `HttpOnly` cookie; later requests may present either.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use homestay_auth::IssuedSession;
use homestay_core::models::user::{SignIn, SignUp};
use serde_json::json;

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser, session_context, session_token};
use crate::state::AppState;

fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build((state.auth.config().cookie_name.clone(), value))
        .http_only(true)
        .secure(state.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

fn issued_response(state: &AppState, jar: CookieJar, issued: IssuedSession) -> Response {
    let jar = jar.add(session_cookie(state, issued.token.clone()));
    (
        jar,
        Json(json!({
            "token": issued.token,
            "session": issued.session,
            "user": issued.user,
        })),
    )
        .into_response()
}

/// `POST /api/auth/sign-up`
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    ApiJson(input): ApiJson<SignUp>,
) -> Result<Response, ApiError> {
    let issued = state
        .auth
        .sign_up(input, session_context(&headers))
        .await?;
    Ok(issued_response(&state, jar, issued))
}

/// `POST /api/auth/sign-in`
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    ApiJson(input): ApiJson<SignIn>,
) -> Result<Response, ApiError> {
    let issued = state
        .auth
        .sign_in(input, session_context(&headers))
        .await?;
    Ok(issued_response(&state, jar, issued))
}

/// `POST /api/auth/sign-out`. Always clears the cookie.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    if let Some(token) = session_token(&headers, &state.auth.config().cookie_name) {
        state.auth.sign_out(&token).await?;
    }

    let jar = jar.remove(
        Cookie::build((state.auth.config().cookie_name.clone(), ""))
            .path("/")
            .build(),
    );
    Ok((jar, Json(json!({ "success": true }))).into_response())
}

/// `GET /api/auth/session`
pub async fn session(CurrentUser(auth): CurrentUser) -> Json<serde_json::Value> {
    Json(json!({
        "session": auth.session,
        "user": auth.user,
    }))
}
