//! PostgreSQL user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{DbPool, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{NewCredential, UserRecord};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    account: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            account: row.account,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// `users` table access. Uniqueness comes from the table's unique index on `account`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_account(&self, account: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, account, password_hash, created_at FROM users WHERE account = $1",
        )
        .bind(account)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn create(&self, credential: NewCredential) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (account, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (account) DO NOTHING
            RETURNING id, account, password_hash, created_at
            "#,
        )
        .bind(&credential.account)
        .bind(&credential.password_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRecord::from).ok_or(AppError::DuplicateAccount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use crate::db::run_migrations;

    async fn test_store() -> Option<PgUserStore> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = match create_pool(&url).await {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("Skip postgres store test: {}", e);
                return None;
            }
        };
        run_migrations(&pool).await.ok()?;
        Some(PgUserStore::new(pool))
    }

    fn unique_account() -> String {
        format!("pg{}", Uuid::new_v4().simple())
    }

    #[tokio::test]
    async fn create_then_find() {
        let Some(store) = test_store().await else {
            eprintln!("Skip postgres store test: set TEST_DATABASE_URL");
            return;
        };
        let account = unique_account();
        let created = store
            .create(NewCredential {
                account: account.clone(),
                password_hash: "$argon2id$v=19$stub".to_string(),
            })
            .await
            .unwrap();
        let found = store.find_by_account(&account).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(store.find_by_account("nosuchaccount0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected_by_the_index() {
        let Some(store) = test_store().await else {
            return;
        };
        let account = unique_account();
        let first = NewCredential {
            account: account.clone(),
            password_hash: "$argon2id$v=19$first".to_string(),
        };
        let second = NewCredential {
            account: account.clone(),
            password_hash: "$argon2id$v=19$second".to_string(),
        };
        store.create(first).await.unwrap();
        assert!(matches!(
            store.create(second).await,
            Err(AppError::DuplicateAccount)
        ));
        let kept = store.find_by_account(&account).await.unwrap().unwrap();
        assert_eq!(kept.password_hash, "$argon2id$v=19$first");
    }
}
