//! Postgres-backed account store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{AccountStore, StoreResult};
use crate::account::Account;
use crate::configuration::DatabaseSettings;
use crate::error::StoreError;

type AccountRow = (String, String, String, String, String, DateTime<Utc>);

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, then apply pending migrations
    pub async fn connect(config: &DatabaseSettings) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string())
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Migration failed: {}", e)))?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn save(&self, account: Account) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (email, first_name, last_name, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT email, first_name, last_name, password_hash, role, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(email.to_string()))?;

        let (email, first_name, last_name, password_hash, role, created_at) = row;
        let role = role.parse().map_err(StoreError::Unavailable)?;

        Ok(Account {
            email,
            first_name,
            last_name,
            password_hash,
            role,
            created_at,
        })
    }
}
