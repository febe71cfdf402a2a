/// Account storage
///
/// The credential core only needs two operations from storage: insert a new
/// account (failing on a duplicate key) and look one up by its key.

use async_trait::async_trait;

use crate::account::Account;
use crate::error::StoreError;

mod memory;
mod postgres;

pub use memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; `Conflict` if the email is taken
    async fn save(&self, account: Account) -> StoreResult<()>;

    /// Look an account up by email; `NotFound` if absent
    async fn find_by_email(&self, email: &str) -> StoreResult<Account>;
}
