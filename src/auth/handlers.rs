//! Auth HTTP handlers: register, login, me.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::handlers::http::{AppJson, AppState};
use crate::middleware::auth::AuthUser;
use crate::models::{CredentialsRequest, UserInfo};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_info: UserInfo,
    pub token: String,
    pub expires_at: String,
}

/// POST /account/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> Result<Json<UserInfo>, AppError> {
    let user = state.accounts().register(body).await?;
    Ok(Json(UserInfo::from(&user)))
}

/// POST /account/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let outcome = state.accounts().login(body).await?;
    Ok(Json(LoginResponse {
        user_info: UserInfo::from(&outcome.user),
        token: outcome.token.token,
        expires_at: outcome.token.expires_at.to_rfc3339(),
    }))
}

/// GET /account/me
pub async fn me(AuthUser(user): AuthUser) -> Json<UserInfo> {
    Json(UserInfo::from(&user))
}
