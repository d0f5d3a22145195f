//! Application error types and their HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("{field}: validation failed")]
    Validation { field: String },

    #[error("Account already registered")]
    DuplicateAccount,

    /// Unknown account and wrong password both land here.
    #[error("Invalid account or password")]
    AuthenticationFailed,

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
        }
    }

    /// Application-level response code carried in every error body.
    pub fn code(&self) -> u32 {
        match self {
            AppError::Validation { .. } => 40002,
            AppError::DuplicateAccount => 40901,
            AppError::AuthenticationFailed => 40401,
            AppError::TokenExpired => 40101,
            AppError::TokenInvalid(_) => 40102,
            AppError::Persistence(_) => 50001,
            AppError::TokenIssuance(_) => 50002,
            AppError::Hash(_) => 50003,
            AppError::Config(_) | AppError::Internal(_) => 50000,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::DuplicateAccount => StatusCode::CONFLICT,
            AppError::AuthenticationFailed
            | AppError::TokenExpired
            | AppError::TokenInvalid(_) => StatusCode::UNAUTHORIZED,
            AppError::Config(_)
            | AppError::Persistence(_)
            | AppError::TokenIssuance(_)
            | AppError::Hash(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }
}

/// Undecodable bodies are validation failures, attributed to the field serde
/// names in its message when there is one.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        debug!(status = %rejection.status(), detail = %detail, "rejected request body");
        AppError::validation(rejected_field(&detail))
    }
}

fn rejected_field(detail: &str) -> &'static str {
    ["account", "password"]
        .into_iter()
        .find(|field| detail.contains(&format!("{}:", field)))
        .unwrap_or("request")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            e if e.is_internal() => {
                error!(error = %e, code = e.code(), "request failed");
                "Internal server error".to_string()
            }
            // Keep the reason server-side; callers only learn the token is bad.
            AppError::TokenInvalid(_) => "Invalid token".to_string(),
            e => e.to_string(),
        };

        let body = Json(json!({ "code": self.code(), "error": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_names_the_field() {
        let (status, json) = body_json(AppError::validation("account")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], 40002);
        assert_eq!(json["error"], "account: validation failed");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], 50000);
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn token_errors_are_distinct() {
        let (expired_status, expired) = body_json(AppError::TokenExpired).await;
        let (invalid_status, invalid) =
            body_json(AppError::TokenInvalid("InvalidSignature".to_string())).await;
        assert_eq!(expired_status, StatusCode::UNAUTHORIZED);
        assert_eq!(invalid_status, StatusCode::UNAUTHORIZED);
        assert_ne!(expired["code"], invalid["code"]);
        assert_eq!(invalid["error"], "Invalid token");
    }

    #[test]
    fn rejected_field_comes_from_serde_message() {
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: \
                 account: invalid type: integer `123`, expected a string at line 1 column 14"
            ),
            "account"
        );
        assert_eq!(
            rejected_field("Failed to parse the request body as JSON: expected value"),
            "request"
        );
    }

    #[test]
    fn duplicate_maps_to_conflict() {
        assert_eq!(AppError::DuplicateAccount.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::DuplicateAccount.code(), 40901);
    }
}
