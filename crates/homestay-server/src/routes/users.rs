//! Super-admin user management.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use homestay_auth::require_role;
use homestay_core::access::Role;
use homestay_core::models::user::{ChangeRole, UpdateUser, UserListing};
use homestay_core::repository::UserRepository;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

/// `GET /api/users`
pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
) -> Result<Response, ApiError> {
    require_role(&auth.user, Role::SuperAdmin)?;

    let users: Vec<UserListing> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(UserListing::from)
        .collect();
    Ok(Json(users).into_response())
}

/// `PATCH /api/users`
pub async fn change_role(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth): CurrentUser,
    ApiJson(input): ApiJson<ChangeRole>,
) -> Result<Response, ApiError> {
    require_role(&auth.user, Role::SuperAdmin)?;

    if input.user_id == auth.user.id {
        return Err(ApiError::bad_request("You cannot change your own role"));
    }

    let updated = state
        .users
        .update(
            input.user_id,
            UpdateUser {
                role: Some(input.role),
                ..Default::default()
            },
        )
        .await?;
    info!(
        user_id = %updated.id,
        role = updated.role.as_str(),
        admin_id = %auth.user.id,
        "User role changed"
    );

    Ok(Json(json!({ "success": true, "user": UserListing::from(updated) })).into_response())
}
