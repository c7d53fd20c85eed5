use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::auth::repo_types::User;
use crate::buyers::model::{CreateBuyerInput, NewBuyer};

#[derive(Debug, Clone)]
pub struct BuyerRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub input: CreateBuyerInput,
}

#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub buyer_id: Uuid,
    pub changed_by: Uuid,
    pub diff: Value,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    buyers: Vec<BuyerRow>,
    history: Vec<HistoryRow>,
}

/// Store kept in process memory. A multi-row write that fails part way is
/// undone before the lock is released, so readers never see half of it.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_history: AtomicBool,
    fail_lookups: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the history insert of every following `create_buyer` fail.
    pub fn fail_history_inserts(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }

    /// Makes every following user lookup fail as if the database were down.
    pub fn fail_user_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn users(&self) -> Vec<User> {
        self.tables.lock().unwrap().users.clone()
    }

    pub fn buyers(&self) -> Vec<BuyerRow> {
        self.tables.lock().unwrap().buyers.clone()
    }

    pub fn history(&self) -> Vec<HistoryRow> {
        self.tables.lock().unwrap().history.clone()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Unexpected(anyhow::anyhow!("connection refused")));
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn create_buyer(&self, buyer: &NewBuyer, diff: &Value) -> StoreResult<Uuid> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.users.iter().any(|u| u.id == buyer.owner_id) {
            return Err(StoreError::Unexpected(anyhow::anyhow!(
                "buyers.owner_id violates foreign key"
            )));
        }

        // The buyer row is in the table before the history insert runs; a
        // failure there truncates back to `mark`, like a rolled-back transaction.
        let mark = tables.buyers.len();
        let id = Uuid::new_v4();
        tables.buyers.push(BuyerRow {
            id,
            owner_id: buyer.owner_id,
            input: buyer.input.clone(),
        });

        if self.fail_history.load(Ordering::SeqCst) {
            tables.buyers.truncate(mark);
            return Err(StoreError::Unexpected(anyhow::anyhow!(
                "insert buyer_history failed"
            )));
        }
        tables.history.push(HistoryRow {
            buyer_id: id,
            changed_by: buyer.owner_id,
            diff: diff.clone(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buyers::model::{City, PropertyType, Purpose, Source, Timeline};
    use serde_json::json;

    fn input() -> CreateBuyerInput {
        CreateBuyerInput {
            full_name: "Asha Verma".into(),
            email: None,
            phone: "9876543210".into(),
            city: City::Mohali,
            property_type: PropertyType::Plot,
            bhk: None,
            purpose: Purpose::Buy,
            budget_min: None,
            budget_max: None,
            timeline: Timeline::Exploring,
            source: Source::Website,
            notes: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn failed_history_insert_keeps_earlier_buyers_only() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@b.com", "hash").await.unwrap();
        let buyer = NewBuyer {
            owner_id: user.id,
            input: input(),
        };
        let kept = store
            .create_buyer(&buyer, &json!({ "created": {} }))
            .await
            .unwrap();

        store.fail_history_inserts(true);
        assert!(store.create_buyer(&buyer, &json!({})).await.is_err());

        let buyers = store.buyers();
        assert_eq!(buyers.len(), 1);
        assert_eq!(buyers[0].id, kept);
        assert_eq!(store.history().len(), 1);

        store.fail_history_inserts(false);
        store.create_buyer(&buyer, &json!({})).await.unwrap();
        assert_eq!(store.buyers().len(), 2);
        assert_eq!(store.history().len(), 2);
    }

    #[tokio::test]
    async fn unknown_owner_is_rejected() {
        let store = InMemoryStore::new();
        let buyer = NewBuyer {
            owner_id: Uuid::new_v4(),
            input: input(),
        };
        assert!(store.create_buyer(&buyer, &json!({})).await.is_err());
        assert!(store.buyers().is_empty());
    }
}
