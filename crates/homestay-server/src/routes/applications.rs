//! Volunteer application intake and moderator review.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use homestay_auth::require_moderator;
use homestay_core::models::application::{CreateApplication, UpdateApplication};
use homestay_core::repository::ApplicationRepository;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{CurrentUser, ValidatedJson, parse_id};
use crate::mail;
use crate::state::AppState;

/// `POST /api/applications` (public)
pub async fn create(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<CreateApplication>,
) -> Result<Response, ApiError> {
    let application = state.applications.create(input).await?;
    info!(application_id = %application.id, program = %application.program, "Application received");

    mail::send_in_background(
        state.mailer.clone(),
        mail::application_received(&application),
    );

    Ok((StatusCode::CREATED, Json(application)).into_response())
}

/// `GET /api/applications`
pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
) -> Result<Response, ApiError> {
    require_moderator(&auth.user)?;
    let applications = state.applications.list().await?;
    Ok(Json(applications).into_response())
}

/// `GET /api/applications/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_moderator(&auth.user)?;
    let application = state.applications.get_by_id(parse_id(&id)?).await?;
    Ok(Json(application).into_response())
}

/// `PATCH /api/applications/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateApplication>,
) -> Result<Response, ApiError> {
    require_moderator(&auth.user)?;
    let id = parse_id(&id)?;

    let application = state.applications.update(id, input).await?;
    info!(application_id = %id, status = application.status.as_str(), "Application updated");

    Ok(Json(application).into_response())
}
