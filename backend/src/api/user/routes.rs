//! Defines the HTTP routes for user endpoints.

use crate::api::user::handlers::*;
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::get};

/// Creates the user router; everything here requires a valid bearer token.
pub fn user_router() -> Router {
    Router::new().route(
        "/profile",
        get(get_profile).layer(middleware::from_fn(jwt_auth)),
    )
}
