//! Handler functions for user-related API endpoints.

use crate::api::common::service_error_to_http;
use crate::repositories::user_repository::UserRepository;
use crate::state::AppState;
use crate::utils::jwt::Claims;
use axum::{extract::Extension, http::StatusCode, response::Json as ResponseJson};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Sanitized account view: no password hash, no OTP fields.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Get the profile of the authenticated user
#[axum::debug_handler]
pub async fn get_profile(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<UserProfile>, (StatusCode, String)> {
    let repo = UserRepository::new(&state.pool);

    match repo.get_user_by_id(claims.user_id()).await {
        Ok(Some(user)) => Ok(ResponseJson(UserProfile {
            verified: user.is_verified(),
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        })),
        Ok(None) => Err((StatusCode::NOT_FOUND, "User not found".to_string())),
        Err(error) => Err(service_error_to_http(error)),
    }
}
