//! Public review endpoints and review submission.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use homestay_auth::authorize;
use homestay_core::access::{Action, Resource};
use homestay_core::error::HomestayError;
use homestay_core::models::review::{
    ReviewListParams, ReviewListQuery, ReviewWithAuthor, SubmitReview,
};
use homestay_core::models::user::UserSummary;
use homestay_core::repository::ReviewRepository;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{with_authors, with_total_count};
use crate::error::ApiError;
use crate::extract::{CurrentUser, MaybeUser, ValidatedJson, parse_id};
use crate::mail;
use crate::state::AppState;

/// `POST /api/reviews`
pub async fn submit(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    ValidatedJson(input): ValidatedJson<SubmitReview>,
) -> Result<Response, ApiError> {
    let user = auth.user;
    authorize(&user, Resource::Review, &[Action::Write])?;

    if state.reviews.exists_for_user(user.id).await? {
        return Err(HomestayError::AlreadyExists {
            entity: "review".into(),
        }
        .into());
    }

    // The unique index still guards a concurrent first submission.
    let review = state.reviews.create(input.into_create(user.id)).await?;
    info!(review_id = %review.id, user_id = %user.id, "Review submitted");

    mail::send_in_background(
        state.mailer.clone(),
        mail::review_thank_you(&user.email, &user.name, &review),
    );

    let data = ReviewWithAuthor {
        review,
        user: Some(UserSummary::from(&user)),
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Review submitted successfully and is pending approval",
            "data": data,
        })),
    )
        .into_response())
}

/// `GET /api/reviews`
pub async fn list_approved(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReviewListParams>,
) -> Result<Response, ApiError> {
    let page = state
        .reviews
        .list(ReviewListQuery::from_params(&params, true))
        .await?;
    let items = with_authors(&state, page.items).await?;
    Ok(with_total_count(page.total, items))
}

/// `GET /api/reviews/{id}`. Unapproved reviews are reported as missing.
pub async fn get_approved(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let review = state.reviews.get_by_id(id).await?;
    if !review.approved {
        return Err(HomestayError::not_found("review", id).into());
    }

    let mut items = with_authors(&state, vec![review]).await?;
    Ok(Json(items.remove(0)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ExistsParams {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// `GET /api/reviews/exists?userId=`. Only answers `true` to the user in
/// question.
pub async fn exists(
    State(state): State<Arc<AppState>>,
    MaybeUser(auth): MaybeUser,
    Query(params): Query<ExistsParams>,
) -> Result<Response, ApiError> {
    let Some(auth) = auth else {
        return Ok(Json(json!({ "exists": false })).into_response());
    };
    let asked_for_self = params
        .user_id
        .as_deref()
        .is_some_and(|id| id == auth.user.id.to_string());
    if !asked_for_self {
        return Ok(Json(json!({ "exists": false })).into_response());
    }

    let exists = state.reviews.exists_for_user(auth.user.id).await?;
    Ok(Json(json!({ "exists": exists })).into_response())
}

/// `POST /api/send-email`. Sends the thank-you email synchronously.
pub async fn send_thank_you(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
) -> Result<Response, ApiError> {
    let user = auth.user;
    authorize(&user, Resource::Review, &[Action::Write])?;

    let review = state.reviews.get_by_user(user.id).await?;
    state
        .mailer
        .send(mail::review_thank_you(&user.email, &user.name, &review))
        .await
        .map_err(|e| ApiError::upstream("Failed to send email", e))?;

    Ok(Json(json!({ "message": "Email sent!" })).into_response())
}
