//! Main entry point for the Verimail backend.
//!
//! This file initializes the Axum web server, sets up the database pool and
//! shared application state, and registers all API routes and middleware.
//! Configuration problems abort startup before the listener binds.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod state;
mod utils;

use crate::api::common::ApiResponse;
use crate::state::AppState;
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    let state = Arc::new(AppState::new(&config, &db)?);

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/api/auth", auth::routes::auth_router())
        .nest("/api/user", api::user::routes::user_router())
        .layer(Extension(state));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting Verimail server on port {}", config.server_port);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Verimail Backend",
            "version": "0.1.0"
        }),
        "Welcome to the Verimail API",
    ))
}
