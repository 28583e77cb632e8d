use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SessionCreateRequest {
    pub username: String,
    pub password: String,
    #[serde(rename = "reCAPTCHA", default)]
    pub recaptcha_token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionCreateResponse {
    pub username: String,
    #[serde(rename = "authToken")]
    pub auth_token: String,
}
