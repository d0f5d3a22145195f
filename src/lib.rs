//! Account registration and password login for a web backend.
//!
//! Passwords are stored as Argon2id PHC strings; a successful login returns a
//! signed, time-bound JWT. The user store is a trait so the flows run against
//! PostgreSQL in production and an in-memory map in tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::http::AppState;
pub use services::AccountService;

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router (account, health). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let account_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/account", account_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
