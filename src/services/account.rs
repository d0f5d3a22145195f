//! Registration and login orchestration over a `UserStore`, a password hasher
//! and a token issuer.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::auth::{IssuedToken, PasswordHasher, TokenIssuer};
use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::{AuthenticatedIdentity, CredentialsRequest, NewCredential, UserRecord};

/// Successful login: the user and their freshly issued token.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserRecord,
    pub token: IssuedToken,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    token_ttl: Duration,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        token_ttl: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            token_ttl,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Validate, hash and persist a new account.
    pub async fn register(&self, request: CredentialsRequest) -> AppResult<UserRecord> {
        request.check()?;
        let CredentialsRequest { account, password } = request;

        // Early answer for the common case; `create` below is the real guard.
        if self.store.find_by_account(&account).await?.is_some() {
            debug!(account = %account, "registration rejected: account exists");
            return Err(AppError::DuplicateAccount);
        }

        let hasher = self.hasher.clone();
        let password_hash = blocking(move || hasher.hash(&password)).await??;

        let user = self
            .store
            .create(NewCredential {
                account,
                password_hash,
            })
            .await
            .map_err(|e| {
                if matches!(e, AppError::DuplicateAccount) {
                    debug!("registration lost a race on account uniqueness");
                }
                e
            })?;

        info!(account = %user.account, user_id = %user.id, "account registered");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    ///
    /// An unknown account and a wrong password both return
    /// `AppError::AuthenticationFailed` after one hash verification.
    pub async fn login(&self, request: CredentialsRequest) -> AppResult<LoginOutcome> {
        request.check()?;
        let CredentialsRequest { account, password } = request;

        let user = self.store.find_by_account(&account).await?;

        let hasher = self.hasher.clone();
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let verified = blocking(move || match stored_hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!(account = %account, "login failed");
                return Err(AppError::AuthenticationFailed);
            }
        };

        let token = self
            .tokens
            .issue(&AuthenticatedIdentity::from(&user), self.token_ttl)?;

        info!(account = %user.account, expires_at = %token.expires_at, "login succeeded");
        Ok(LoginOutcome { user, token })
    }

    /// Resolve a bearer token to the current user record.
    pub async fn authenticate(&self, token: &str) -> AppResult<UserRecord> {
        let identity = self.tokens.verify(token)?;
        match self.store.find_by_account(&identity.account).await? {
            Some(user) if user.id == identity.user_id => Ok(user),
            _ => Err(AppError::TokenInvalid(
                "account no longer exists".to_string(),
            )),
        }
    }
}

/// Run CPU-heavy hashing off the async workers.
async fn blocking<F, T>(f: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("hashing task: {}", e)))
}
