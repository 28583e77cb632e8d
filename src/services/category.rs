use std::sync::Arc;

use super::{ServiceError, TAG_MAX_LENGTH, TAG_MIN_LENGTH, storage_failure};
use crate::database::{CategoryStorage, StorageError};
use crate::models::{Category, CategoryCreateRequest, CategoryUpdateRequest};
use crate::utils::is_within;

pub struct CategoryService {
    storage: Arc<dyn CategoryStorage>,
}

impl CategoryService {
    pub fn new(storage: Arc<dyn CategoryStorage>) -> Self {
        Self { storage }
    }

    pub async fn create_category(&self, req: &CategoryCreateRequest) -> Result<Category, ServiceError> {
        let errors = validate_tag(&req.tag);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        self.storage
            .insert_category(req)
            .await
            .map_err(|e| storage_failure("category service - create", e))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        self.storage
            .find_all_categories()
            .await
            .map_err(|e| storage_failure("category service - list", e))
    }

    pub async fn update_category(&self, req: &CategoryUpdateRequest) -> Result<Category, ServiceError> {
        let mut errors = Vec::new();
        if req.id <= 0 {
            errors.push("category id is invalid".to_string());
        }
        errors.extend(validate_tag(&req.tag));
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let mut category = match self.storage.find_category_by_id(req.id).await {
            Ok(category) => category,
            Err(StorageError::NotFound) => return Err(ServiceError::NotFound("category")),
            Err(e) => return Err(storage_failure("category service - update", e)),
        };
        category.tag = req.tag.clone();

        self.storage
            .update_category(&category)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => ServiceError::NotFound("category"),
                e => storage_failure("category service - update", e),
            })
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), ServiceError> {
        match self.storage.delete_category_by_id(id).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound) => Err(ServiceError::NotFound("category")),
            Err(StorageError::ForeignKeyViolation) => {
                tracing::warn!("category service - category {} still has invitations", id);
                Err(ServiceError::validation("category still has invitations"))
            }
            Err(e) => Err(storage_failure("category service - delete", e)),
        }
    }
}

fn validate_tag(tag: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_within(tag.chars().count(), TAG_MIN_LENGTH, TAG_MAX_LENGTH) {
        errors.push(format!(
            "category tag must be between {} to {} characters",
            TAG_MIN_LENGTH, TAG_MAX_LENGTH
        ));
    }
    errors
}
