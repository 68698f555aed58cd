//! Dashboard review moderation.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use homestay_auth::authorize;
use homestay_core::access::{Action, Resource};
use homestay_core::models::review::{Review, ReviewListParams, ReviewListQuery, ReviewPatch};
use homestay_core::models::user::User;
use homestay_core::repository::{ReviewRepository, UserRepository};
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use super::{with_authors, with_total_count};
use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser, parse_id};
use crate::mail;
use crate::state::AppState;

/// `GET /api/get-all-reviews`
pub async fn list_all(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    Query(params): Query<ReviewListParams>,
) -> Result<Response, ApiError> {
    authorize(&auth.user, Resource::Dashboard, &[Action::View])?;

    let page = state
        .reviews
        .list(ReviewListQuery::from_params(&params, false))
        .await?;
    let items = with_authors(&state, page.items).await?;
    Ok(with_total_count(page.total, items))
}

/// `GET /api/get-all-reviews/{id}`
pub async fn get_any(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authorize(&auth.user, Resource::Dashboard, &[Action::View])?;
    let id = parse_id(&id)?;

    let review = state.reviews.get_by_id(id).await?;
    let mut items = with_authors(&state, vec![review]).await?;
    Ok(Json(items.remove(0)).into_response())
}

/// `PATCH /api/get-all-reviews/{id}`
pub async fn approve_update(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Response, ApiError> {
    authorize(
        &auth.user,
        Resource::Dashboard,
        &[Action::Approve, Action::Update],
    )?;
    apply_patch(&state, &auth.user, parse_id(&id)?, &body).await
}

/// `PUT /api/get-all-reviews/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Response, ApiError> {
    authorize(&auth.user, Resource::Dashboard, &[Action::Update])?;
    apply_patch(&state, &auth.user, parse_id(&id)?, &body).await
}

async fn apply_patch(
    state: &AppState,
    moderator: &User,
    id: Uuid,
    body: &Value,
) -> Result<Response, ApiError> {
    let patch = ReviewPatch::from_json(body)?;
    let before = state.reviews.get_by_id(id).await?;
    let after = state.reviews.update(id, patch).await?;

    info!(
        review_id = %id,
        moderator_id = %moderator.id,
        approved = after.approved,
        "Review updated"
    );

    if !before.approved && after.approved {
        notify_approval(state, &after).await;
    }

    let mut items = with_authors(state, vec![after]).await?;
    Ok(Json(items.remove(0)).into_response())
}

async fn notify_approval(state: &AppState, review: &Review) {
    match state.users.get_by_id(review.user_id).await {
        Ok(author) => mail::send_in_background(
            state.mailer.clone(),
            mail::review_approved(&author.email, &author.name, review),
        ),
        Err(e) => warn!(review_id = %review.id, error = %e, "Approval email skipped"),
    }
}

/// `DELETE /api/get-all-reviews/{id}` and `DELETE /api/reviews/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authorize(&auth.user, Resource::Dashboard, &[Action::View, Action::Delete])?;
    let id = parse_id(&id)?;

    state.reviews.delete(id).await?;
    info!(review_id = %id, moderator_id = %auth.user.id, "Review deleted");

    Ok(Json(json!({ "message": "Review deleted successfully" })).into_response())
}
