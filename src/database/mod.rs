// 数据库模块
// 存储接口定义，Postgres 与内存两种实现

mod memory;
pub mod operations;

pub use memory::MemoryStorage;
pub use operations::{CategoryOperation, InvitationOperation, RsvpOperation};

use async_trait::async_trait;

use crate::models::{
    Category, CategoryCreateRequest, Invitation, InvitationCreateRequest, Rsvp, RsvpCreateRequest,
};

// 约束名称，与 migrations 中保持一致
pub const UNIQUE_TAG: &str = "unique_tag";
pub const UNIQUE_GREETING: &str = "unique_greeting";
pub const UNIQUE_MOBILE_PHONE_NUMBER: &str = "unique_mobile_phone_number";
pub const UNIQUE_PRIVATE_ID: &str = "unique_private_id";
pub const UNIQUE_INVITATION_PRIVATE_ID: &str = "unique_invitation_private_id";

const KNOWN_UNIQUE_CONSTRAINTS: [&str; 5] = [
    UNIQUE_TAG,
    UNIQUE_GREETING,
    UNIQUE_MOBILE_PHONE_NUMBER,
    UNIQUE_PRIVATE_ID,
    UNIQUE_INVITATION_PRIVATE_ID,
];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,
    #[error("unique constraint {0} violated")]
    UniqueViolation(&'static str),
    #[error("foreign key constraint violated")]
    ForeignKeyViolation,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or_default();
                let known = KNOWN_UNIQUE_CONSTRAINTS
                    .into_iter()
                    .find(|name| *name == constraint)
                    .unwrap_or("unknown");
                return StorageError::UniqueViolation(known);
            }
            if db_err.is_foreign_key_violation() {
                return StorageError::ForeignKeyViolation;
            }
        }

        if matches!(err, sqlx::Error::RowNotFound) {
            return StorageError::NotFound;
        }

        StorageError::Database(err)
    }
}

#[async_trait]
pub trait CategoryStorage: Send + Sync {
    async fn insert_category(&self, req: &CategoryCreateRequest) -> Result<Category, StorageError>;
    async fn find_category_by_id(&self, id: i64) -> Result<Category, StorageError>;
    /// 按标签倒序返回
    async fn find_all_categories(&self) -> Result<Vec<Category>, StorageError>;
    async fn update_category(&self, category: &Category) -> Result<Category, StorageError>;
    async fn delete_category_by_id(&self, id: i64) -> Result<(), StorageError>;
}

#[async_trait]
pub trait InvitationStorage: Send + Sync {
    /// 写入时生成新的 private id，状态为未发送
    async fn insert_invitation(
        &self,
        req: &InvitationCreateRequest,
    ) -> Result<Invitation, StorageError>;
    async fn find_invitation_by_id(&self, id: i64) -> Result<Invitation, StorageError>;
    async fn find_invitation_by_private_id(
        &self,
        private_id: &str,
    ) -> Result<Invitation, StorageError>;
    async fn find_all_invitations(&self) -> Result<Vec<Invitation>, StorageError>;
    async fn update_invitation(&self, invitation: &Invitation) -> Result<Invitation, StorageError>;
    async fn delete_invitation_by_id(&self, id: i64) -> Result<(), StorageError>;
}

#[async_trait]
pub trait RsvpStorage: Send + Sync {
    async fn insert_rsvp(&self, req: &RsvpCreateRequest) -> Result<Rsvp, StorageError>;
    async fn find_rsvp_by_id(&self, id: i64) -> Result<Rsvp, StorageError>;
    async fn find_rsvp_by_invitation_private_id(
        &self,
        private_id: &str,
    ) -> Result<Rsvp, StorageError>;
    async fn find_all_rsvps(&self) -> Result<Vec<Rsvp>, StorageError>;
    async fn update_rsvp(&self, rsvp: &Rsvp) -> Result<Rsvp, StorageError>;
    async fn delete_rsvp_by_id(&self, id: i64) -> Result<(), StorageError>;
}
