use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 邀请状态，`RA`/`RN` 只由 RSVP 推导得出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpStatus {
    #[serde(rename = "NS")]
    NotSent,
    #[serde(rename = "ST")]
    Sent,
    #[serde(rename = "RA")]
    RepliedAttending,
    #[serde(rename = "RN")]
    RepliedNotAttending,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::NotSent => "NS",
            RsvpStatus::Sent => "ST",
            RsvpStatus::RepliedAttending => "RA",
            RsvpStatus::RepliedNotAttending => "RN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NS" => Some(RsvpStatus::NotSent),
            "ST" => Some(RsvpStatus::Sent),
            "RA" => Some(RsvpStatus::RepliedAttending),
            "RN" => Some(RsvpStatus::RepliedNotAttending),
            _ => None,
        }
    }

    /// 管理员只能手动设置为未发送或已发送
    pub fn is_settable(&self) -> bool {
        matches!(self, RsvpStatus::NotSent | RsvpStatus::Sent)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDetails {
    #[serde(rename = "categoryID")]
    pub category_id: i64,
    pub greeting: String,
    pub maximum_guest_count: i32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub mobile_phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: i64,
    #[serde(flatten)]
    pub details: InvitationDetails,
    #[serde(rename = "privateID")]
    pub private_id: String,
    pub status: RsvpStatus,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitationCreateRequest {
    #[serde(flatten)]
    pub details: InvitationDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitationUpdateRequest {
    #[serde(flatten)]
    pub details: InvitationDetails,
    #[serde(default)]
    pub id: i64,
    pub status: RsvpStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitationSmsRequest {
    #[serde(rename = "privateID")]
    pub private_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        for status in [
            RsvpStatus::NotSent,
            RsvpStatus::Sent,
            RsvpStatus::RepliedAttending,
            RsvpStatus::RepliedNotAttending,
        ] {
            assert_eq!(RsvpStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RsvpStatus::parse("XX"), None);
    }

    #[test]
    fn test_only_unreplied_statuses_are_settable() {
        assert!(RsvpStatus::NotSent.is_settable());
        assert!(RsvpStatus::Sent.is_settable());
        assert!(!RsvpStatus::RepliedAttending.is_settable());
        assert!(!RsvpStatus::RepliedNotAttending.is_settable());
    }

    #[test]
    fn test_update_request_json() {
        let req: InvitationUpdateRequest = serde_json::from_str(
            r#"{"id":3,"categoryID":1,"greeting":"Mr & Mrs Tan","maximumGuestCount":2,"status":"ST"}"#,
        )
        .unwrap();

        assert_eq!(req.id, 3);
        assert_eq!(req.details.category_id, 1);
        assert_eq!(req.details.maximum_guest_count, 2);
        assert_eq!(req.details.notes, "");
        assert_eq!(req.status, RsvpStatus::Sent);
    }
}
