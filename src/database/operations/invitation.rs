// 邀请存储

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::{InvitationStorage, StorageError};
use crate::models::{Invitation, InvitationCreateRequest, InvitationDetails, RsvpStatus};

const INVITATION_COLUMNS: &str = "id, category_id, private_id, greeting, maximum_guest_count, \
     notes, mobile_phone_number, status, updated_at";

#[derive(Debug, FromRow)]
struct InvitationRow {
    id: i64,
    category_id: i64,
    private_id: String,
    greeting: String,
    maximum_guest_count: i32,
    notes: String,
    mobile_phone_number: String,
    status: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = StorageError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        let status = RsvpStatus::parse(&row.status).ok_or_else(|| {
            StorageError::Database(sqlx::Error::Decode(
                format!("unknown invitation status {}", row.status).into(),
            ))
        })?;

        Ok(Invitation {
            id: row.id,
            details: InvitationDetails {
                category_id: row.category_id,
                greeting: row.greeting,
                maximum_guest_count: row.maximum_guest_count,
                notes: row.notes,
                mobile_phone_number: row.mobile_phone_number,
            },
            private_id: row.private_id,
            status,
            updated_at: row.updated_at,
        })
    }
}

pub struct InvitationOperation {
    db: Arc<PgPool>,
}

impl InvitationOperation {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvitationStorage for InvitationOperation {
    async fn insert_invitation(
        &self,
        req: &InvitationCreateRequest,
    ) -> Result<Invitation, StorageError> {
        let private_id = Uuid::new_v4().to_string();
        let details = &req.details;

        let query = format!(
            r#"
            INSERT INTO invitations
                (category_id, private_id, greeting, maximum_guest_count, notes, mobile_phone_number, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        );

        let row = sqlx::query_as::<_, InvitationRow>(&query)
            .bind(details.category_id)
            .bind(&private_id)
            .bind(&details.greeting)
            .bind(details.maximum_guest_count)
            .bind(&details.notes)
            .bind(&details.mobile_phone_number)
            .bind(RsvpStatus::NotSent.as_str())
            .fetch_one(&*self.db)
            .await
            .map_err(|e| {
                tracing::warn!("postgres - unable to insert invitation {}: {}", details.greeting, e);
                StorageError::from(e)
            })?;

        row.try_into()
    }

    async fn find_invitation_by_id(&self, id: i64) -> Result<Invitation, StorageError> {
        let query = format!("SELECT {} FROM invitations WHERE id = $1", INVITATION_COLUMNS);
        let row = sqlx::query_as::<_, InvitationRow>(&query)
            .bind(id)
            .fetch_one(&*self.db)
            .await?;

        row.try_into()
    }

    async fn find_invitation_by_private_id(
        &self,
        private_id: &str,
    ) -> Result<Invitation, StorageError> {
        let query = format!("SELECT {} FROM invitations WHERE private_id = $1", INVITATION_COLUMNS);
        let row = sqlx::query_as::<_, InvitationRow>(&query)
            .bind(private_id)
            .fetch_one(&*self.db)
            .await?;

        row.try_into()
    }

    async fn find_all_invitations(&self) -> Result<Vec<Invitation>, StorageError> {
        let query = format!("SELECT {} FROM invitations ORDER BY id", INVITATION_COLUMNS);
        let rows = sqlx::query_as::<_, InvitationRow>(&query)
            .fetch_all(&*self.db)
            .await?;

        rows.into_iter().map(Invitation::try_from).collect()
    }

    async fn update_invitation(&self, invitation: &Invitation) -> Result<Invitation, StorageError> {
        let details = &invitation.details;
        let query = format!(
            r#"
            UPDATE invitations
            SET category_id = $2, greeting = $3, maximum_guest_count = $4, notes = $5,
                mobile_phone_number = $6, status = $7, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            INVITATION_COLUMNS
        );

        let row = sqlx::query_as::<_, InvitationRow>(&query)
            .bind(invitation.id)
            .bind(details.category_id)
            .bind(&details.greeting)
            .bind(details.maximum_guest_count)
            .bind(&details.notes)
            .bind(&details.mobile_phone_number)
            .bind(invitation.status.as_str())
            .fetch_one(&*self.db)
            .await?;

        row.try_into()
    }

    async fn delete_invitation_by_id(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
