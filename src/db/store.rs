//! User store seam.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewCredential, UserRecord};

/// Storage for user credentials, keyed by account name.
///
/// `create` must enforce account uniqueness itself and report a clash as
/// `AppError::DuplicateAccount`; callers rely on that, not on a prior lookup.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_account(&self, account: &str) -> AppResult<Option<UserRecord>>;

    async fn create(&self, credential: NewCredential) -> AppResult<UserRecord>;
}
