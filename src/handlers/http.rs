//! Shared state and the health probe.

use axum::{extract::FromRequest, http::StatusCode, Json};
use serde_json::json;

use crate::error::AppError;
use crate::services::AccountService;

/// `Json` whose rejections go through `AppError`, so bad bodies get the
/// usual `{code, error}` envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(accounts: AccountService) -> Self {
        Self { accounts }
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "account-auth" })),
    )
}
