//! Account records and the register/login request body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult};

// Keep in sync with the `#[validate]` bounds on `CredentialsRequest`.
pub const ACCOUNT_MAX_LEN: usize = 64;
pub const PASSWORD_MAX_LEN: usize = 128;

/// Stored user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub account: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Credential handed to the store on registration. `password_hash` is a PHC string.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub account: String,
    pub password_hash: String,
}

/// Who a request is acting as, once a password or token has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_id: Uuid,
    pub account: String,
}

impl From<&UserRecord> for AuthenticatedIdentity {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.id,
            account: user.account.clone(),
        }
    }
}

/// Public view of a user; never carries the hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub account: String,
    pub created_at: String,
}

impl From<&UserRecord> for UserInfo {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            account: user.account.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Body of both `POST /account/register` and `POST /account/login`.
/// Missing fields deserialize as empty and fail validation.
#[derive(Deserialize, Validate)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 64),
        custom(function = "validate_account_chars")
    )]
    pub account: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CredentialsRequest {
    pub fn new(account: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            password: password.into(),
        }
    }

    /// Run field validation, reporting the first failing field.
    pub fn check(&self) -> AppResult<()> {
        self.validate().map_err(|e| AppError::validation(first_invalid_field(&e)))
    }
}

fn validate_account_chars(account: &str) -> Result<(), ValidationError> {
    if account.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("alpha_num"))
    }
}

fn first_invalid_field(errors: &ValidationErrors) -> &'static str {
    let fields = errors.field_errors();
    if fields.contains_key("account") {
        "account"
    } else if fields.contains_key("password") {
        "password"
    } else {
        "request"
    }
}
