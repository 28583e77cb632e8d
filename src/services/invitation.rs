use std::collections::HashMap;
use std::sync::Arc;

use super::{
    DEFAULT_PHONE_EXTENSION, GREETING_MAX_LENGTH, GREETING_MIN_LENGTH, MAXIMUM_GUEST_COUNT_MAX,
    MAXIMUM_GUEST_COUNT_MIN, MOBILE_PHONE_NUMBER_MAX_LENGTH, NOTE_MAX_LENGTH, ServiceError,
    storage_failure,
};
use crate::database::{InvitationStorage, StorageError};
use crate::models::{
    Invitation, InvitationCreateRequest, InvitationDetails, InvitationUpdateRequest, Rsvp,
    RsvpStatus,
};
use crate::utils::is_within;

pub struct InvitationService {
    storage: Arc<dyn InvitationStorage>,
}

impl InvitationService {
    pub fn new(storage: Arc<dyn InvitationStorage>) -> Self {
        Self { storage }
    }

    pub async fn create_invitation(
        &self,
        req: &InvitationCreateRequest,
    ) -> Result<Invitation, ServiceError> {
        let errors = validate_details(&req.details);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        // 未填写号码时使用默认区号
        let mut req = req.clone();
        if req.details.mobile_phone_number.is_empty() {
            req.details.mobile_phone_number = DEFAULT_PHONE_EXTENSION.to_string();
        }

        self.storage
            .insert_invitation(&req)
            .await
            .map_err(|e| match e {
                StorageError::ForeignKeyViolation => ServiceError::validation("category does not exist"),
                e => storage_failure("invitation service - create", e),
            })
    }

    /// 列出全部邀请，已回复的邀请按 RSVP 结果显示为 `RA` 或 `RN`
    pub async fn list_invitations(&self, rsvps: &[Rsvp]) -> Result<Vec<Invitation>, ServiceError> {
        let mut invitations = self
            .storage
            .find_all_invitations()
            .await
            .map_err(|e| storage_failure("invitation service - list", e))?;

        let replies: HashMap<&str, bool> = rsvps
            .iter()
            .map(|r| (r.invitation_private_id.as_str(), r.details.attending))
            .collect();

        for invitation in &mut invitations {
            if let Some(attending) = replies.get(invitation.private_id.as_str()) {
                invitation.status = if *attending {
                    RsvpStatus::RepliedAttending
                } else {
                    RsvpStatus::RepliedNotAttending
                };
            }
        }

        Ok(invitations)
    }

    pub async fn update_invitation(
        &self,
        req: &InvitationUpdateRequest,
    ) -> Result<Invitation, ServiceError> {
        let mut errors = Vec::new();
        if req.id <= 0 {
            errors.push("invitation id is invalid".to_string());
        }
        if !req.status.is_settable() {
            errors.push("status is invalid".to_string());
        }
        errors.extend(validate_details(&req.details));
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let mut invitation = self.find_by_id(req.id).await?;
        invitation.details = req.details.clone();
        if invitation.details.mobile_phone_number.is_empty() {
            invitation.details.mobile_phone_number = DEFAULT_PHONE_EXTENSION.to_string();
        }
        invitation.status = req.status;

        self.storage
            .update_invitation(&invitation)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => ServiceError::NotFound("invitation"),
                StorageError::ForeignKeyViolation => ServiceError::validation("category does not exist"),
                e => storage_failure("invitation service - update", e),
            })
    }

    pub async fn delete_invitation(&self, id: i64) -> Result<(), ServiceError> {
        match self.storage.delete_invitation_by_id(id).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound) => Err(ServiceError::NotFound("invitation")),
            Err(e) => Err(storage_failure("invitation service - delete", e)),
        }
    }

    pub async fn retrieve_invitation_by_private_id(
        &self,
        private_id: &str,
    ) -> Result<Invitation, ServiceError> {
        match self.storage.find_invitation_by_private_id(private_id).await {
            Ok(invitation) => Ok(invitation),
            Err(StorageError::NotFound) => Err(ServiceError::NotFound("invitation")),
            Err(e) => Err(storage_failure("invitation service - retrieve", e)),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Invitation, ServiceError> {
        match self.storage.find_invitation_by_id(id).await {
            Ok(invitation) => Ok(invitation),
            Err(StorageError::NotFound) => Err(ServiceError::NotFound("invitation")),
            Err(e) => Err(storage_failure("invitation service - find", e)),
        }
    }
}

/// 号码为空或只有默认区号时视为没有号码
pub fn has_phone_number(invitation: &Invitation) -> bool {
    let phone = invitation.details.mobile_phone_number.trim();
    !phone.is_empty() && phone != DEFAULT_PHONE_EXTENSION
}

fn validate_details(details: &InvitationDetails) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_within(
        details.greeting.chars().count(),
        GREETING_MIN_LENGTH,
        GREETING_MAX_LENGTH,
    ) {
        errors.push(format!(
            "invitation greeting must be between {} to {} characters",
            GREETING_MIN_LENGTH, GREETING_MAX_LENGTH
        ));
    }
    if !is_within(
        details.maximum_guest_count,
        MAXIMUM_GUEST_COUNT_MIN,
        MAXIMUM_GUEST_COUNT_MAX,
    ) {
        errors.push(format!(
            "invitation maximum guest count must be between {} to {}",
            MAXIMUM_GUEST_COUNT_MIN, MAXIMUM_GUEST_COUNT_MAX
        ));
    }
    if details.notes.chars().count() > NOTE_MAX_LENGTH {
        errors.push(format!(
            "invitation note must be less than {} characters",
            NOTE_MAX_LENGTH
        ));
    }
    if details.mobile_phone_number.chars().count() > MOBILE_PHONE_NUMBER_MAX_LENGTH {
        errors.push(format!(
            "invitation mobile phone number must be less than {} in length",
            MOBILE_PHONE_NUMBER_MAX_LENGTH
        ));
    }
    errors
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::database::{CategoryStorage, MemoryStorage};
    use crate::models::{CategoryCreateRequest, RsvpDetails};

    async fn setup() -> (InvitationService, i64) {
        let storage = Arc::new(MemoryStorage::new());
        let category = storage
            .insert_category(&CategoryCreateRequest { tag: "family".into() })
            .await
            .unwrap();
        (InvitationService::new(storage), category.id)
    }

    fn details(category_id: i64, greeting: &str, phone: &str) -> InvitationDetails {
        InvitationDetails {
            category_id,
            greeting: greeting.into(),
            maximum_guest_count: 2,
            notes: "table 3".into(),
            mobile_phone_number: phone.into(),
        }
    }

    fn reply(private_id: &str, attending: bool) -> Rsvp {
        Rsvp {
            id: Some(1),
            details: RsvpDetails {
                full_name: "Guest".into(),
                attending,
                ..Default::default()
            },
            invitation_private_id: private_id.into(),
            completed: true,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_phone_extension() {
        let (invitations, category_id) = setup().await;

        let invitation = invitations
            .create_invitation(&InvitationCreateRequest {
                details: details(category_id, "Uncle Tan", ""),
            })
            .await
            .unwrap();

        assert_eq!(invitation.details.mobile_phone_number, "+65");
        assert_eq!(invitation.status, RsvpStatus::NotSent);
        assert!(!invitation.private_id.is_empty());
        assert!(!has_phone_number(&invitation));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (invitations, category_id) = setup().await;
        let mut invalid = details(category_id, "X", &"9".repeat(21));
        invalid.maximum_guest_count = 11;
        invalid.notes = "n".repeat(501);

        match invitations
            .create_invitation(&InvitationCreateRequest { details: invalid })
            .await
        {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors.len(), 4),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_greeting() {
        let (invitations, category_id) = setup().await;
        invitations
            .create_invitation(&InvitationCreateRequest {
                details: details(category_id, "Uncle Tan", "+6591111111"),
            })
            .await
            .unwrap();

        match invitations
            .create_invitation(&InvitationCreateRequest {
                details: details(category_id, "Uncle Tan", "+6592222222"),
            })
            .await
        {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors, vec!["greeting already exists".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_maps_replies() {
        let (invitations, category_id) = setup().await;
        let a = invitations
            .create_invitation(&InvitationCreateRequest {
                details: details(category_id, "Uncle Tan", "+6591111111"),
            })
            .await
            .unwrap();
        let b = invitations
            .create_invitation(&InvitationCreateRequest {
                details: details(category_id, "Aunt May", "+6592222222"),
            })
            .await
            .unwrap();
        invitations
            .create_invitation(&InvitationCreateRequest {
                details: details(category_id, "Cousin Joe", "+6593333333"),
            })
            .await
            .unwrap();

        let replies = vec![reply(&a.private_id, true), reply(&b.private_id, false)];
        let listed = invitations.list_invitations(&replies).await.unwrap();

        let status = |greeting: &str| {
            listed
                .iter()
                .find(|i| i.details.greeting == greeting)
                .map(|i| i.status)
        };
        assert_eq!(status("Uncle Tan"), Some(RsvpStatus::RepliedAttending));
        assert_eq!(status("Aunt May"), Some(RsvpStatus::RepliedNotAttending));
        assert_eq!(status("Cousin Joe"), Some(RsvpStatus::NotSent));
    }

    #[tokio::test]
    async fn test_update_clearing_phone_defaults_extension() {
        let (invitations, category_id) = setup().await;

        let mut ids = Vec::new();
        for (greeting, phone) in [("Uncle Tan", "+6591111111"), ("Auntie Lim", "+6592222222")] {
            let invitation = invitations
                .create_invitation(&InvitationCreateRequest {
                    details: details(category_id, greeting, phone),
                })
                .await
                .unwrap();
            ids.push((invitation.id, greeting));
        }

        for (id, greeting) in ids {
            let updated = invitations
                .update_invitation(&InvitationUpdateRequest {
                    details: details(category_id, greeting, ""),
                    id,
                    status: RsvpStatus::Sent,
                })
                .await
                .unwrap();

            assert_eq!(updated.details.mobile_phone_number, "+65");
            assert!(!has_phone_number(&updated));
        }
    }

    #[tokio::test]
    async fn test_update_rules() {
        let (invitations, category_id) = setup().await;
        let invitation = invitations
            .create_invitation(&InvitationCreateRequest {
                details: details(category_id, "Uncle Tan", "+6591111111"),
            })
            .await
            .unwrap();

        let updated = invitations
            .update_invitation(&InvitationUpdateRequest {
                details: details(category_id, "Uncle Tan & family", "+6591111111"),
                id: invitation.id,
                status: RsvpStatus::Sent,
            })
            .await
            .unwrap();
        assert_eq!(updated.details.greeting, "Uncle Tan & family");
        assert_eq!(updated.status, RsvpStatus::Sent);
        assert_eq!(updated.private_id, invitation.private_id);

        assert!(matches!(
            invitations
                .update_invitation(&InvitationUpdateRequest {
                    details: details(category_id, "Uncle Tan", "+6591111111"),
                    id: invitation.id,
                    status: RsvpStatus::RepliedAttending,
                })
                .await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            invitations
                .update_invitation(&InvitationUpdateRequest {
                    details: details(category_id, "Nobody", "+6599999999"),
                    id: 999,
                    status: RsvpStatus::Sent,
                })
                .await,
            Err(ServiceError::NotFound("invitation"))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_lookup() {
        let (invitations, category_id) = setup().await;
        let invitation = invitations
            .create_invitation(&InvitationCreateRequest {
                details: details(category_id, "Uncle Tan", "+6591111111"),
            })
            .await
            .unwrap();

        let found = invitations
            .retrieve_invitation_by_private_id(&invitation.private_id)
            .await
            .unwrap();
        assert_eq!(found.id, invitation.id);

        invitations.delete_invitation(invitation.id).await.unwrap();
        assert!(matches!(
            invitations.delete_invitation(invitation.id).await,
            Err(ServiceError::NotFound("invitation"))
        ));
        assert!(matches!(
            invitations
                .retrieve_invitation_by_private_id(&invitation.private_id)
                .await,
            Err(ServiceError::NotFound("invitation"))
        ));
    }
}
