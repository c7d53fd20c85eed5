use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::auth::repo_types::User;
use crate::buyers::model::{Choice, NewBuyer};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_buyer(&self, buyer: &NewBuyer, diff: &Value) -> StoreResult<Uuid> {
        let input = &buyer.input;
        // Dropping `tx` before commit rolls both inserts back.
        let mut tx = self.db.begin().await.context("begin tx")?;

        let buyer_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO buyers (
                owner_id, full_name, email, phone, city, property_type, bhk, purpose,
                budget_min, budget_max, timeline, source, notes, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(buyer.owner_id)
        .bind(&input.full_name)
        .bind(input.email.as_deref())
        .bind(&input.phone)
        .bind(input.city.as_str())
        .bind(input.property_type.as_str())
        .bind(input.bhk.map(|b| b.as_str()))
        .bind(input.purpose.as_str())
        .bind(input.budget_min)
        .bind(input.budget_max)
        .bind(input.timeline.as_str())
        .bind(input.source.as_str())
        .bind(input.notes.as_deref())
        .bind(&input.tags)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO buyer_history (buyer_id, changed_by, diff)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(buyer_id)
        .bind(buyer.owner_id)
        .bind(Json(diff))
        .execute(&mut *tx)
        .await?;

        tx.commit().await.context("commit tx")?;
        Ok(buyer_id)
    }
}
