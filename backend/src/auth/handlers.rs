//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for the account lifecycle
//! (signup, OTP verification, login, password recovery), parse request data,
//! and interact with the `auth::service` for core business logic.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::state::AppState;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use std::sync::Arc;

/// Handle signup request: 201 with an acknowledgement, never the code itself.
#[axum::debug_handler]
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<()>>), (StatusCode, String)> {
    let auth_service = AuthService::new(&state);

    match auth_service.signup(payload).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(
                (),
                "User created successfully. OTP sent to your email for verification.",
            )),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle OTP verification request
#[axum::debug_handler]
pub async fn verify_otp(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<ResponseJson<TokenResponse>, (StatusCode, String)> {
    let auth_service = AuthService::new(&state);

    match auth_service.verify_otp(payload).await {
        Ok(response) => Ok(ResponseJson(response)),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<TokenResponse>, (StatusCode, String)> {
    let auth_service = AuthService::new(&state);

    match auth_service.login(payload).await {
        Ok(response) => Ok(ResponseJson(response)),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle password recovery request
#[axum::debug_handler]
pub async fn forgot_password(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&state);

    match auth_service.forgot_password(payload).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            (),
            "OTP sent to your email",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle password reset request
#[axum::debug_handler]
pub async fn reset_password(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&state);

    match auth_service.reset_password(payload).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            (),
            "Password reset successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
