#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tower::ServiceExt;

use rsvp_backend::{
    AppState,
    auth::{SecurityProvider, SessionManager, TokenService},
    cache::MemoryCache,
    config::{Config, JwtConfig, SessionConfig, TwilioConfig},
    database::MemoryStorage,
    middleware::AUTH_HEADER,
    routes::create_router,
    services::{CategoryService, InvitationService, RsvpService},
    sms::{SmsError, SmsSender},
};

pub const ADMIN_USERNAME: &str = "kevin";
pub const ADMIN_PASSWORD: &str = "correct horse";
pub const VALID_CAPTCHA: &str = "valid-captcha";
pub const RSVP_LINK_BASE: &str = "https://rsvp.example.com/rsvp/";

pub struct StubSecurity;

#[async_trait]
impl SecurityProvider for StubSecurity {
    fn validate_credentials(&self, username: &str, password: &str) -> bool {
        username.to_lowercase() == ADMIN_USERNAME && password == ADMIN_PASSWORD
    }

    async fn verify_recaptcha(&self, token: &str) -> bool {
        token == VALID_CAPTCHA
    }
}

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SmsSender for RecordingSms {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), SmsError> {
        self.sent.lock().push((to.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub cache: Arc<MemoryCache>,
    pub sms: Arc<RecordingSms>,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        db_max_connections: 1,
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: "/api".into(),
        jwt: JwtConfig {
            hmac_secret: "integration-secret".into(),
            token_issuer: "rsvp-integration".into(),
        },
        session: SessionConfig { duration_secs: 60 },
        admin_credentials: HashMap::new(),
        recaptcha_secret: String::new(),
        twilio: TwilioConfig::default(),
        rsvp_link_base: RSVP_LINK_BASE.into(),
    }
}

pub fn test_app() -> TestApp {
    let config = test_config();
    let cache = Arc::new(MemoryCache::new());
    let tokens = Arc::new(TokenService::new(&config.jwt));
    let sessions = Arc::new(SessionManager::new(
        config.session.clone(),
        tokens,
        cache.clone(),
    ));
    let storage = Arc::new(MemoryStorage::new());
    let sms = Arc::new(RecordingSms::default());

    let state = AppState {
        config: Arc::new(config),
        sessions,
        security: Arc::new(StubSecurity),
        sms: sms.clone(),
        categories: Arc::new(CategoryService::new(storage.clone())),
        invitations: Arc::new(InvitationService::new(storage.clone())),
        rsvps: Arc::new(RsvpService::new(storage)),
    };

    TestApp {
        router: create_router(state),
        cache,
        sms,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTH_HEADER, token);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, body)
    }

    pub async fn login(&self) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/sessions",
                None,
                Some(json!({
                    "username": ADMIN_USERNAME,
                    "password": ADMIN_PASSWORD,
                    "reCAPTCHA": VALID_CAPTCHA,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["authToken"].as_str().unwrap().to_string()
    }

    pub async fn create_category(&self, token: &str, tag: &str) -> Value {
        let (status, body) = self
            .request(Method::POST, "/api/categories", Some(token), Some(json!({ "tag": tag })))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body
    }

    pub async fn create_invitation(
        &self,
        token: &str,
        category_id: i64,
        greeting: &str,
        phone: &str,
    ) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/invitations",
                Some(token),
                Some(json!({
                    "categoryID": category_id,
                    "greeting": greeting,
                    "maximumGuestCount": 2,
                    "notes": "",
                    "mobilePhoneNumber": phone,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body
    }
}
