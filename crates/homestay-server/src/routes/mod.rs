//! HTTP routes. Every path lives under `/api`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderName, header::ACCESS_CONTROL_EXPOSE_HEADERS},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use homestay_core::error::HomestayResult;
use homestay_core::models::review::{Review, ReviewWithAuthor};
use homestay_core::models::user::UserSummary;
use homestay_core::repository::UserRepository;
use serde::Serialize;

use crate::state::AppState;

mod applications;
mod auth;
mod landing;
mod moderation;
mod reviews;
mod upload;
mod users;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Reviews
        .route("/api/reviews", post(reviews::submit).get(reviews::list_approved))
        .route("/api/reviews/exists", get(reviews::exists))
        .route(
            "/api/reviews/{id}",
            get(reviews::get_approved).delete(moderation::delete),
        )
        .route("/api/send-email", post(reviews::send_thank_you))
        // Moderation
        .route("/api/get-all-reviews", get(moderation::list_all))
        .route(
            "/api/get-all-reviews/{id}",
            get(moderation::get_any)
                .patch(moderation::approve_update)
                .put(moderation::update)
                .delete(moderation::delete),
        )
        // Applications
        .route(
            "/api/applications",
            post(applications::create).get(applications::list),
        )
        .route(
            "/api/applications/{id}",
            get(applications::get).patch(applications::update),
        )
        // CMS
        .route(
            "/api/landing-page",
            get(landing::get_all).patch(landing::upsert),
        )
        .route("/api/upload", post(upload::upload))
        // Users
        .route("/api/users", get(users::list).patch(users::change_role))
        // Auth
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/session", get(auth::session))
}

/// JSON array body plus `X-Total-Count` for list endpoints.
pub(crate) fn with_total_count<T: Serialize>(total: u64, items: T) -> Response {
    (
        [
            (HeaderName::from_static(TOTAL_COUNT_HEADER), total.to_string()),
            (ACCESS_CONTROL_EXPOSE_HEADERS, "X-Total-Count".to_string()),
        ],
        Json(items),
    )
        .into_response()
}

/// Attach each review's author with a single batched user lookup.
pub(crate) async fn with_authors(
    state: &AppState,
    reviews: Vec<Review>,
) -> HomestayResult<Vec<ReviewWithAuthor>> {
    let mut ids: Vec<_> = reviews.iter().map(|r| r.user_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let authors: HashMap<_, _> = state
        .users
        .get_many(&ids)
        .await?
        .iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();

    Ok(reviews
        .into_iter()
        .map(|review| ReviewWithAuthor {
            user: authors.get(&review.user_id).cloned(),
            review,
        })
        .collect())
}
