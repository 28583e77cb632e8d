use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpDetails {
    pub full_name: String,
    pub attending: bool,
    #[serde(default)]
    pub guest_count: i32,
    #[serde(default)]
    pub special_diet: bool,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub mobile_phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsvp {
    // 尚未回复的草稿没有 id
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub details: RsvpDetails,
    #[serde(
        rename = "invitationPrivateID",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub invitation_private_id: String,
    pub completed: bool,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsvpCreateRequest {
    #[serde(flatten)]
    pub details: RsvpDetails,
    #[serde(rename = "invitationPrivateID", default)]
    pub invitation_private_id: String,
    #[serde(rename = "reCAPTCHA", default)]
    pub recaptcha_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RsvpUpdateRequest {
    #[serde(flatten)]
    pub details: RsvpDetails,
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "invitationPrivateID", default)]
    pub invitation_private_id: String,
}
