// 短信发送
// 通过 Twilio 向受邀者发送 RSVP 链接

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::TwilioConfig;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("sms provider is not configured")]
    NotConfigured,
    #[error("sms request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("sms provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), SmsError>;
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    #[serde(default)]
    message: String,
}

pub struct TwilioService {
    config: TwilioConfig,
    api_base: String,
    client: reqwest::Client,
}

impl TwilioService {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            api_base: TWILIO_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.api_base, self.config.account_sid)
    }
}

#[async_trait]
impl SmsSender for TwilioService {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), SmsError> {
        if !self.config.is_configured() {
            tracing::error!("Twilio credentials missing, unable to send SMS to {}", to);
            return Err(SmsError::NotConfigured);
        }

        let form = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("SMS sent to {}", to);
            return Ok(());
        }

        let message = response
            .json::<TwilioErrorResponse>()
            .await
            .map(|e| e.message)
            .unwrap_or_default();
        tracing::error!("Twilio rejected SMS to {}: {} {}", to, status, message);

        Err(SmsError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
