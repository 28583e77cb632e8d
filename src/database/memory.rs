// 内存存储
// 与 Postgres 实现保持相同的约束语义，用于本地开发和测试

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{
    CategoryStorage, InvitationStorage, RsvpStorage, StorageError, UNIQUE_GREETING,
    UNIQUE_INVITATION_PRIVATE_ID, UNIQUE_MOBILE_PHONE_NUMBER, UNIQUE_TAG,
};
use crate::models::{
    Category, CategoryCreateRequest, Invitation, InvitationCreateRequest, Rsvp, RsvpCreateRequest,
    RsvpStatus,
};

// 与迁移中部分唯一索引的排除条件一致
const BARE_PHONE_EXTENSION: &str = "+65";

#[derive(Default)]
struct Tables {
    next_id: i64,
    categories: BTreeMap<i64, String>,
    invitations: BTreeMap<i64, Invitation>,
    rsvps: BTreeMap<i64, Rsvp>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn category(&self, id: i64) -> Option<Category> {
        let tag = self.categories.get(&id)?;
        let total = self
            .invitations
            .values()
            .filter(|i| i.details.category_id == id)
            .count() as i64;

        Some(Category {
            id,
            tag: tag.clone(),
            total,
        })
    }

    fn check_invitation(&self, invitation: &Invitation) -> Result<(), StorageError> {
        if !self.categories.contains_key(&invitation.details.category_id) {
            return Err(StorageError::ForeignKeyViolation);
        }

        for other in self.invitations.values().filter(|o| o.id != invitation.id) {
            if other.details.greeting == invitation.details.greeting {
                return Err(StorageError::UniqueViolation(UNIQUE_GREETING));
            }
            let phone = &invitation.details.mobile_phone_number;
            if phone != BARE_PHONE_EXTENSION && other.details.mobile_phone_number == *phone {
                return Err(StorageError::UniqueViolation(UNIQUE_MOBILE_PHONE_NUMBER));
            }
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryStorage for MemoryStorage {
    async fn insert_category(&self, req: &CategoryCreateRequest) -> Result<Category, StorageError> {
        let mut tables = self.tables.lock();
        if tables.categories.values().any(|tag| *tag == req.tag) {
            return Err(StorageError::UniqueViolation(UNIQUE_TAG));
        }

        let id = tables.next_id();
        tables.categories.insert(id, req.tag.clone());

        tables.category(id).ok_or(StorageError::NotFound)
    }

    async fn find_category_by_id(&self, id: i64) -> Result<Category, StorageError> {
        self.tables.lock().category(id).ok_or(StorageError::NotFound)
    }

    async fn find_all_categories(&self) -> Result<Vec<Category>, StorageError> {
        let tables = self.tables.lock();
        let mut categories: Vec<Category> = tables
            .categories
            .keys()
            .filter_map(|id| tables.category(*id))
            .collect();
        categories.sort_by(|a, b| b.tag.cmp(&a.tag));

        Ok(categories)
    }

    async fn update_category(&self, category: &Category) -> Result<Category, StorageError> {
        let mut tables = self.tables.lock();
        if !tables.categories.contains_key(&category.id) {
            return Err(StorageError::NotFound);
        }
        if tables
            .categories
            .iter()
            .any(|(id, tag)| *id != category.id && *tag == category.tag)
        {
            return Err(StorageError::UniqueViolation(UNIQUE_TAG));
        }

        tables.categories.insert(category.id, category.tag.clone());
        tables.category(category.id).ok_or(StorageError::NotFound)
    }

    async fn delete_category_by_id(&self, id: i64) -> Result<(), StorageError> {
        let mut tables = self.tables.lock();
        if !tables.categories.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        if tables.invitations.values().any(|i| i.details.category_id == id) {
            return Err(StorageError::ForeignKeyViolation);
        }

        tables.categories.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl InvitationStorage for MemoryStorage {
    async fn insert_invitation(
        &self,
        req: &InvitationCreateRequest,
    ) -> Result<Invitation, StorageError> {
        let mut tables = self.tables.lock();
        let mut invitation = Invitation {
            id: 0,
            details: req.details.clone(),
            private_id: Uuid::new_v4().to_string(),
            status: RsvpStatus::NotSent,
            updated_at: Utc::now(),
        };
        tables.check_invitation(&invitation)?;

        invitation.id = tables.next_id();
        tables.invitations.insert(invitation.id, invitation.clone());

        Ok(invitation)
    }

    async fn find_invitation_by_id(&self, id: i64) -> Result<Invitation, StorageError> {
        self.tables
            .lock()
            .invitations
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_invitation_by_private_id(
        &self,
        private_id: &str,
    ) -> Result<Invitation, StorageError> {
        self.tables
            .lock()
            .invitations
            .values()
            .find(|i| i.private_id == private_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_all_invitations(&self) -> Result<Vec<Invitation>, StorageError> {
        Ok(self.tables.lock().invitations.values().cloned().collect())
    }

    async fn update_invitation(&self, invitation: &Invitation) -> Result<Invitation, StorageError> {
        let mut tables = self.tables.lock();
        if !tables.invitations.contains_key(&invitation.id) {
            return Err(StorageError::NotFound);
        }
        tables.check_invitation(invitation)?;

        let mut updated = invitation.clone();
        updated.updated_at = Utc::now();
        tables.invitations.insert(updated.id, updated.clone());

        Ok(updated)
    }

    async fn delete_invitation_by_id(&self, id: i64) -> Result<(), StorageError> {
        self.tables
            .lock()
            .invitations
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl RsvpStorage for MemoryStorage {
    async fn insert_rsvp(&self, req: &RsvpCreateRequest) -> Result<Rsvp, StorageError> {
        let mut tables = self.tables.lock();
        if tables
            .rsvps
            .values()
            .any(|r| r.invitation_private_id == req.invitation_private_id)
        {
            return Err(StorageError::UniqueViolation(UNIQUE_INVITATION_PRIVATE_ID));
        }

        let id = tables.next_id();
        let rsvp = Rsvp {
            id: Some(id),
            details: req.details.clone(),
            invitation_private_id: req.invitation_private_id.clone(),
            completed: true,
            updated_at: Utc::now(),
        };
        tables.rsvps.insert(id, rsvp.clone());

        Ok(rsvp)
    }

    async fn find_rsvp_by_id(&self, id: i64) -> Result<Rsvp, StorageError> {
        self.tables
            .lock()
            .rsvps
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_rsvp_by_invitation_private_id(
        &self,
        private_id: &str,
    ) -> Result<Rsvp, StorageError> {
        self.tables
            .lock()
            .rsvps
            .values()
            .find(|r| r.invitation_private_id == private_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_all_rsvps(&self) -> Result<Vec<Rsvp>, StorageError> {
        Ok(self.tables.lock().rsvps.values().cloned().collect())
    }

    async fn update_rsvp(&self, rsvp: &Rsvp) -> Result<Rsvp, StorageError> {
        let id = rsvp.id.ok_or(StorageError::NotFound)?;
        let mut tables = self.tables.lock();
        let existing = tables.rsvps.get_mut(&id).ok_or(StorageError::NotFound)?;

        existing.details = rsvp.details.clone();
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }

    async fn delete_rsvp_by_id(&self, id: i64) -> Result<(), StorageError> {
        self.tables
            .lock()
            .rsvps
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}
