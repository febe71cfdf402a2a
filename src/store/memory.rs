//! In-memory account store.
//!
//! Accounts live in a `HashMap` guarded by a `tokio::sync::RwLock`. Nothing is
//! durable; it backs local runs without a database and the test suite.

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{AccountStore, StoreResult};
use crate::account::Account;
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn save(&self, account: Account) -> StoreResult<()> {
        let mut accounts = self.accounts.write().await;
        match accounts.entry(account.email.clone()) {
            Entry::Occupied(entry) => Err(StoreError::Conflict(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(account);
                Ok(())
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Account> {
        self.accounts
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::ProfileAttributes;

    fn account(email: &str) -> Account {
        Account::new(
            email.to_string(),
            ProfileAttributes {
                first_name: "Alice".to_string(),
                last_name: "Liddell".to_string(),
            },
            "$2b$04$hash".to_string(),
        )
    }

    #[tokio::test]
    async fn save_then_find() {
        let store = InMemoryAccountStore::new();
        store.save(account("alice@example.com")).await.unwrap();

        let found = store.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(found.email, "alice@example.com");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = InMemoryAccountStore::new();
        store.save(account("alice@example.com")).await.unwrap();

        let result = store.save(account("alice@example.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_email_is_not_found() {
        let store = InMemoryAccountStore::new();
        assert!(store.is_empty().await);

        let result = store.find_by_email("nobody@example.com").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
