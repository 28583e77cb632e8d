use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::utils::verify_password;

const RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// 管理员登录和访客提交所需的安全校验
#[async_trait]
pub trait SecurityProvider: Send + Sync {
    /// 校验管理员用户名和密码，用户名不区分大小写
    fn validate_credentials(&self, username: &str, password: &str) -> bool;

    /// 向 reCAPTCHA 服务确认前端提交的令牌
    async fn verify_recaptcha(&self, token: &str) -> bool;
}

#[derive(Debug, Deserialize)]
struct RecaptchaResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

pub struct SecurityService {
    credentials: HashMap<String, String>,
    recaptcha_secret: String,
    verify_url: String,
    client: reqwest::Client,
}

impl SecurityService {
    pub fn new(credentials: HashMap<String, String>, recaptcha_secret: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            credentials,
            recaptcha_secret,
            verify_url: RECAPTCHA_VERIFY_URL.to_string(),
            client,
        }
    }

    #[cfg(test)]
    fn with_verify_url(mut self, url: impl Into<String>) -> Self {
        self.verify_url = url.into();
        self
    }
}

#[async_trait]
impl SecurityProvider for SecurityService {
    fn validate_credentials(&self, username: &str, password: &str) -> bool {
        let username = username.to_lowercase();
        let Some(hash) = self.credentials.get(&username) else {
            tracing::warn!("Login attempt for unknown user {}", username);
            return false;
        };

        match verify_password(password, hash) {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!("Invalid password supplied for {}", username);
                false
            }
            Err(e) => {
                tracing::error!("Failed to verify password hash for {}: {}", username, e);
                false
            }
        }
    }

    async fn verify_recaptcha(&self, token: &str) -> bool {
        if token.trim().is_empty() {
            tracing::warn!("reCAPTCHA token missing from request");
            return false;
        }

        let response = self
            .client
            .post(&self.verify_url)
            .query(&[("secret", self.recaptcha_secret.as_str()), ("response", token)])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to reach reCAPTCHA service: {}", e);
                return false;
            }
        };

        match response.json::<RecaptchaResponse>().await {
            Ok(body) if body.success && body.error_codes.is_empty() => true,
            Ok(body) => {
                tracing::warn!("reCAPTCHA rejected token: {:?}", body.error_codes);
                false
            }
            Err(e) => {
                tracing::error!("Failed to decode reCAPTCHA response: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SecurityService {
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        SecurityService::new(HashMap::from([("kevin".to_string(), hash)]), "secret".into())
    }

    #[test]
    fn test_validate_credentials() {
        let security = service();

        assert!(security.validate_credentials("kevin", "correct horse"));
        assert!(security.validate_credentials("Kevin", "correct horse"));
        assert!(!security.validate_credentials("kevin", "wrong"));
        assert!(!security.validate_credentials("nobody", "correct horse"));
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        let security = SecurityService::new(
            HashMap::from([("kevin".to_string(), "not-a-hash".to_string())]),
            "secret".into(),
        );

        assert!(!security.validate_credentials("kevin", "anything"));
    }

    #[tokio::test]
    async fn test_blank_recaptcha_token_fails() {
        assert!(!service().verify_recaptcha("").await);
        assert!(!service().verify_recaptcha("   ").await);
    }

    #[tokio::test]
    async fn test_unreachable_recaptcha_service_fails() {
        let security = service().with_verify_url("http://127.0.0.1:9/siteverify");
        assert!(!security.verify_recaptcha("token").await);
    }
}
