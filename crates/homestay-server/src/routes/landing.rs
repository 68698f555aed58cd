//! Landing page CMS.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use homestay_auth::require_moderator;
use homestay_core::models::landing::UpsertLandingContent;
use homestay_core::repository::LandingPageRepository;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{CurrentUser, ValidatedJson};
use crate::state::AppState;

/// `GET /api/landing-page`: every block keyed by section.
pub async fn get_all(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let blocks: BTreeMap<_, _> = state
        .landing
        .list()
        .await?
        .into_iter()
        .map(|block| (block.section.clone(), block))
        .collect();
    Ok(Json(blocks).into_response())
}

/// `PATCH /api/landing-page`
pub async fn upsert(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    ValidatedJson(input): ValidatedJson<UpsertLandingContent>,
) -> Result<Response, ApiError> {
    require_moderator(&auth.user)?;

    let block = state.landing.upsert(input).await?;
    info!(section = %block.section, editor_id = %auth.user.id, "Landing page section saved");

    Ok(Json(block).into_response())
}
