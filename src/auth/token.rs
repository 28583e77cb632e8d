use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

pub const USERNAME_CLAIM: &str = "username";

// 由服务自身填写的声明，调用方不能覆盖
const RESERVED_CLAIMS: [&str; 3] = ["iss", "iat", "exp"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String, // 签发者
    pub iat: i64,    // 签发时间
    pub exp: i64,    // 过期时间
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

impl Claims {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.extra.get(name).map(String::as_str)
    }

    pub fn username(&self) -> Option<&str> {
        self.get(USERNAME_CLAIM)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token duration must be greater than zero")]
    InvalidDuration,
    /// 格式错误、签名不符、已过期或签发者不匹配
    #[error("token is invalid")]
    Invalid,
    #[error("token service failure: {0}")]
    General(String),
}

/// 签发和校验 HS256 令牌，不依赖任何外部状态
#[derive(Clone)]
pub struct TokenService {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[config.token_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            issuer: config.token_issuer.clone(),
            encoding_key: EncodingKey::from_secret(config.hmac_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.hmac_secret.as_bytes()),
            validation,
        }
    }

    pub fn generate_auth_token(
        &self,
        additional_claims: &HashMap<String, String>,
        duration: Duration,
    ) -> Result<String, TokenError> {
        if duration.is_zero() {
            tracing::error!("jwt - unable to generate token as duration was zero");
            return Err(TokenError::InvalidDuration);
        }

        let now = Utc::now();
        let expiration = chrono::Duration::from_std(duration)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| TokenError::General("token expiry is out of range".into()))?;

        // 先写入附加声明，再由服务填充保留声明
        let mut extra = HashMap::with_capacity(additional_claims.len());
        for (key, value) in additional_claims {
            if RESERVED_CLAIMS.contains(&key.as_str()) {
                tracing::warn!("jwt - ignoring reserved claim '{}' supplied by caller", key);
                continue;
            }
            extra.insert(key.clone(), value.clone());
        }

        let claims = Claims {
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("jwt - unable to sign token: {}", e);
            TokenError::General(e.to_string())
        })
    }

    pub fn parse_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }

    pub fn is_auth_token_valid(&self, token: &str) -> bool {
        self.parse_token(token).is_ok()
    }
}

fn classify(err: JwtError) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            tracing::warn!("jwt - token is malformed: {}", err);
        }
        ErrorKind::InvalidSignature => {
            tracing::warn!("jwt - token signature is invalid");
        }
        ErrorKind::ExpiredSignature => {
            tracing::warn!("jwt - token has expired");
        }
        ErrorKind::InvalidIssuer => {
            tracing::warn!("jwt - token was issued by an unexpected issuer");
        }
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName | ErrorKind::MissingAlgorithm => {
            tracing::warn!("jwt - token is unverifiable: {}", err);
        }
        ErrorKind::MissingRequiredClaim(claim) => {
            tracing::warn!("jwt - token is missing required claim '{}'", claim);
        }
        ErrorKind::ImmatureSignature | ErrorKind::InvalidAudience | ErrorKind::InvalidSubject => {
            tracing::warn!("jwt - token could not be validated: {}", err);
        }
        _ => {
            tracing::error!("jwt - token could not be parsed: {}", err);
            return TokenError::General(err.to_string());
        }
    }

    TokenError::Invalid
}
