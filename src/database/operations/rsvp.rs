// RSVP 存储
// 已写入的记录都视为已完成

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::{RsvpStorage, StorageError};
use crate::models::{Rsvp, RsvpCreateRequest, RsvpDetails};

const RSVP_COLUMNS: &str = "id, invitation_private_id, full_name, attending, guest_count, \
     special_diet, remarks, mobile_phone_number, updated_at";

#[derive(Debug, FromRow)]
struct RsvpRow {
    id: i64,
    invitation_private_id: String,
    full_name: String,
    attending: bool,
    guest_count: i32,
    special_diet: bool,
    remarks: String,
    mobile_phone_number: String,
    updated_at: DateTime<Utc>,
}

impl From<RsvpRow> for Rsvp {
    fn from(row: RsvpRow) -> Self {
        Rsvp {
            id: Some(row.id),
            details: RsvpDetails {
                full_name: row.full_name,
                attending: row.attending,
                guest_count: row.guest_count,
                special_diet: row.special_diet,
                remarks: row.remarks,
                mobile_phone_number: row.mobile_phone_number,
            },
            invitation_private_id: row.invitation_private_id,
            completed: true,
            updated_at: row.updated_at,
        }
    }
}

pub struct RsvpOperation {
    db: Arc<PgPool>,
}

impl RsvpOperation {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RsvpStorage for RsvpOperation {
    async fn insert_rsvp(&self, req: &RsvpCreateRequest) -> Result<Rsvp, StorageError> {
        let details = &req.details;
        let query = format!(
            r#"
            INSERT INTO rsvps
                (invitation_private_id, full_name, attending, guest_count, special_diet, remarks, mobile_phone_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            RSVP_COLUMNS
        );

        let row = sqlx::query_as::<_, RsvpRow>(&query)
            .bind(&req.invitation_private_id)
            .bind(&details.full_name)
            .bind(details.attending)
            .bind(details.guest_count)
            .bind(details.special_diet)
            .bind(&details.remarks)
            .bind(&details.mobile_phone_number)
            .fetch_one(&*self.db)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "postgres - unable to insert rsvp for {}: {}",
                    req.invitation_private_id,
                    e
                );
                StorageError::from(e)
            })?;

        Ok(row.into())
    }

    async fn find_rsvp_by_id(&self, id: i64) -> Result<Rsvp, StorageError> {
        let query = format!("SELECT {} FROM rsvps WHERE id = $1", RSVP_COLUMNS);
        let row = sqlx::query_as::<_, RsvpRow>(&query)
            .bind(id)
            .fetch_one(&*self.db)
            .await?;

        Ok(row.into())
    }

    async fn find_rsvp_by_invitation_private_id(
        &self,
        private_id: &str,
    ) -> Result<Rsvp, StorageError> {
        let query = format!(
            "SELECT {} FROM rsvps WHERE invitation_private_id = $1",
            RSVP_COLUMNS
        );
        let row = sqlx::query_as::<_, RsvpRow>(&query)
            .bind(private_id)
            .fetch_one(&*self.db)
            .await?;

        Ok(row.into())
    }

    async fn find_all_rsvps(&self) -> Result<Vec<Rsvp>, StorageError> {
        let query = format!("SELECT {} FROM rsvps ORDER BY id", RSVP_COLUMNS);
        let rows = sqlx::query_as::<_, RsvpRow>(&query)
            .fetch_all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(Rsvp::from).collect())
    }

    async fn update_rsvp(&self, rsvp: &Rsvp) -> Result<Rsvp, StorageError> {
        let id = rsvp.id.ok_or(StorageError::NotFound)?;
        let details = &rsvp.details;
        let query = format!(
            r#"
            UPDATE rsvps
            SET full_name = $2, attending = $3, guest_count = $4, special_diet = $5,
                remarks = $6, mobile_phone_number = $7, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            RSVP_COLUMNS
        );

        let row = sqlx::query_as::<_, RsvpRow>(&query)
            .bind(id)
            .bind(&details.full_name)
            .bind(details.attending)
            .bind(details.guest_count)
            .bind(details.special_diet)
            .bind(&details.remarks)
            .bind(&details.mobile_phone_number)
            .fetch_one(&*self.db)
            .await?;

        Ok(row.into())
    }

    async fn delete_rsvp_by_id(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM rsvps WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
