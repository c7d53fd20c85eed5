use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::buyers::model::NewBuyer;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists")]
    Duplicate,
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Database(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users and buyer leads.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Fails with `Duplicate` when the email is already registered.
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User>;

    /// Writes the buyer and its creation history entry as one atomic unit and
    /// returns the buyer id once both are committed.
    async fn create_buyer(&self, buyer: &NewBuyer, diff: &Value) -> StoreResult<Uuid>;
}
