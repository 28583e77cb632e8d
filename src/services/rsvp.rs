use std::sync::Arc;

use super::{
    GREETING_MAX_LENGTH, GREETING_MIN_LENGTH, MAXIMUM_GUEST_COUNT_MAX, MAXIMUM_GUEST_COUNT_MIN,
    MOBILE_PHONE_NUMBER_MAX_LENGTH, MOBILE_PHONE_NUMBER_MIN_LENGTH, NOTE_MAX_LENGTH, ServiceError,
    storage_failure,
};
use crate::database::{RsvpStorage, StorageError};
use crate::models::{Invitation, Rsvp, RsvpCreateRequest, RsvpDetails, RsvpUpdateRequest};
use crate::utils::is_within;

pub struct RsvpService {
    storage: Arc<dyn RsvpStorage>,
}

impl RsvpService {
    pub fn new(storage: Arc<dyn RsvpStorage>) -> Self {
        Self { storage }
    }

    pub async fn create_rsvp(&self, req: &RsvpCreateRequest) -> Result<Rsvp, ServiceError> {
        let errors = validate_details(&req.details);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        self.storage
            .insert_rsvp(req)
            .await
            .map_err(|e| storage_failure("rsvp service - create", e))
    }

    pub async fn list_rsvps(&self) -> Result<Vec<Rsvp>, ServiceError> {
        self.storage
            .find_all_rsvps()
            .await
            .map_err(|e| storage_failure("rsvp service - list", e))
    }

    pub async fn update_rsvp(&self, req: &RsvpUpdateRequest) -> Result<Rsvp, ServiceError> {
        let mut errors = Vec::new();
        if req.id <= 0 {
            errors.push("rsvp id is invalid".to_string());
        }
        errors.extend(validate_details(&req.details));
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let mut rsvp = match self.storage.find_rsvp_by_id(req.id).await {
            Ok(rsvp) => rsvp,
            Err(StorageError::NotFound) => return Err(ServiceError::NotFound("rsvp")),
            Err(e) => return Err(storage_failure("rsvp service - update", e)),
        };
        rsvp.details = req.details.clone();

        self.storage
            .update_rsvp(&rsvp)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => ServiceError::NotFound("rsvp"),
                e => storage_failure("rsvp service - update", e),
            })
    }

    pub async fn delete_rsvp(&self, id: i64) -> Result<(), ServiceError> {
        match self.storage.delete_rsvp_by_id(id).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound) => Err(ServiceError::NotFound("rsvp")),
            Err(e) => Err(storage_failure("rsvp service - delete", e)),
        }
    }

    pub async fn retrieve_private_rsvp(&self, private_id: &str) -> Result<Rsvp, ServiceError> {
        match self.storage.find_rsvp_by_invitation_private_id(private_id).await {
            Ok(rsvp) => Ok(rsvp),
            Err(StorageError::NotFound) => Err(ServiceError::NotFound("rsvp")),
            Err(e) => Err(storage_failure("rsvp service - retrieve", e)),
        }
    }
}

/// 邀请尚未回复时，用邀请信息预填一份草稿
pub fn draft_rsvp(invitation: &Invitation) -> Rsvp {
    Rsvp {
        id: None,
        details: RsvpDetails {
            full_name: invitation.details.greeting.clone(),
            attending: true,
            guest_count: invitation.details.maximum_guest_count,
            special_diet: false,
            remarks: String::new(),
            mobile_phone_number: invitation.details.mobile_phone_number.clone(),
        },
        invitation_private_id: invitation.private_id.clone(),
        completed: false,
        updated_at: invitation.updated_at,
    }
}

fn validate_details(details: &RsvpDetails) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_within(
        details.full_name.chars().count(),
        GREETING_MIN_LENGTH,
        GREETING_MAX_LENGTH,
    ) {
        errors.push(format!(
            "rsvp full name must be between {} to {} characters",
            GREETING_MIN_LENGTH, GREETING_MAX_LENGTH
        ));
    }
    // 不出席时不检查人数
    if details.attending
        && !is_within(
            details.guest_count,
            MAXIMUM_GUEST_COUNT_MIN,
            MAXIMUM_GUEST_COUNT_MAX,
        )
    {
        errors.push(format!(
            "rsvp guest count must be between {} to {}",
            MAXIMUM_GUEST_COUNT_MIN, MAXIMUM_GUEST_COUNT_MAX
        ));
    }
    if details.remarks.chars().count() > NOTE_MAX_LENGTH {
        errors.push(format!(
            "rsvp remarks must be less than {} characters",
            NOTE_MAX_LENGTH
        ));
    }
    if !is_within(
        details.mobile_phone_number.chars().count(),
        MOBILE_PHONE_NUMBER_MIN_LENGTH,
        MOBILE_PHONE_NUMBER_MAX_LENGTH,
    ) {
        errors.push(format!(
            "rsvp mobile phone number must be between {} to {} in length",
            MOBILE_PHONE_NUMBER_MIN_LENGTH, MOBILE_PHONE_NUMBER_MAX_LENGTH
        ));
    }
    errors
}
