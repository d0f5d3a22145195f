//! In-process user store for tests and local runs without PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::{NewCredential, UserRecord};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_account(&self, account: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(account).cloned())
    }

    async fn create(&self, credential: NewCredential) -> AppResult<UserRecord> {
        use std::collections::hash_map::Entry;

        // Check and insert under one write lock.
        let mut users = self.users.write().await;
        match users.entry(credential.account) {
            Entry::Occupied(_) => Err(AppError::DuplicateAccount),
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    id: Uuid::new_v4(),
                    account: slot.key().clone(),
                    password_hash: credential.password_hash,
                    created_at: Utc::now(),
                };
                Ok(slot.insert(record).clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn credential(account: &str, hash: &str) -> NewCredential {
        NewCredential {
            account: account.to_string(),
            password_hash: hash.to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = MemoryUserStore::new();
        let created = store.create(credential("alice123", "h1")).await.unwrap();
        let found = store.find_by_account("alice123").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(store.find_by_account("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_create_is_duplicate_and_keeps_first() {
        let store = MemoryUserStore::new();
        store.create(credential("alice123", "h1")).await.unwrap();
        assert!(matches!(
            store.create(credential("alice123", "h2")).await,
            Err(AppError::DuplicateAccount)
        ));
        let kept = store.find_by_account("alice123").await.unwrap().unwrap();
        assert_eq!(kept.password_hash, "h1");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_creates_admit_exactly_one() {
        let store = Arc::new(MemoryUserStore::new());
        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.create(credential("racer", &format!("h{i}"))).await
            }));
        }
        let mut ok = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AppError::DuplicateAccount) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 1);
    }
}
