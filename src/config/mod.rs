use std::collections::HashMap;
use std::env;
use std::time::Duration;

const DEFAULT_SERVER_PORT: u16 = 6001;
const DEFAULT_SESSION_MINUTES: u64 = 20;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 15;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub admin_credentials: HashMap<String, String>,
    pub recaptcha_secret: String,
    pub twilio: TwilioConfig,
    pub rsvp_link_base: String,
}

/// 签发令牌所需的配置
#[derive(Debug, Clone, serde::Deserialize)]
pub struct JwtConfig {
    pub hmac_secret: String,
    pub token_issuer: String,
}

/// 会话有效期
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SessionConfig {
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
            jwt: JwtConfig {
                hmac_secret: env::var("HMAC_SECRET")?,
                token_issuer: env::var("TOKEN_ISSUER")?,
            },
            session: SessionConfig {
                duration_secs: session_duration_secs(env::var("SESSION_DURATION").ok().as_deref()),
            },
            admin_credentials: parse_credentials(
                &env::var("ADMIN_CREDENTIALS").unwrap_or_default(),
            ),
            recaptcha_secret: env::var("RECAPTCHA_SECRET")?,
            twilio: TwilioConfig {
                account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
                auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
                from_number: env::var("TWILIO_FROM_NUMBER").unwrap_or_default(),
            },
            rsvp_link_base: env::var("RSVP_LINK_BASE")
                .unwrap_or_else(|_| format!("http://localhost:{}/rsvp/", DEFAULT_SERVER_PORT)),
        })
    }
}

impl SessionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

impl TwilioConfig {
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_number.is_empty()
    }
}

// 单位为分钟，可带 "m" 后缀；为 0、无法解析或溢出时使用默认值
fn session_duration_secs(raw: Option<&str>) -> u64 {
    let default_secs = DEFAULT_SESSION_MINUTES * 60;
    let Some(raw) = raw else {
        return default_secs;
    };

    match raw.trim().trim_end_matches('m').parse::<u64>() {
        Ok(minutes) if minutes > 0 => minutes.checked_mul(60).unwrap_or_else(|| {
            tracing::warn!("SESSION_DURATION {} is too large, using default", raw);
            default_secs
        }),
        _ => {
            tracing::warn!("SESSION_DURATION {} is invalid, using default", raw);
            default_secs
        }
    }
}

// 格式: "user1:$2b$10$...,user2:$2b$10$..."，用户名统一转为小写
fn parse_credentials(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (username, hash) = pair.trim().split_once(':')?;
            let username = username.trim().to_lowercase();
            let hash = hash.trim();
            if username.is_empty() || hash.is_empty() {
                tracing::warn!("Skipping malformed admin credential entry");
                return None;
            }
            Some((username, hash.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        let creds = parse_credentials("Kevin:$2b$04$abc, jenny:$2b$04$def");

        assert_eq!(creds.len(), 2);
        assert_eq!(creds.get("kevin").map(String::as_str), Some("$2b$04$abc"));
        assert_eq!(creds.get("jenny").map(String::as_str), Some("$2b$04$def"));
    }

    #[test]
    fn test_parse_credentials_skips_malformed_entries() {
        let creds = parse_credentials("nohash,:orphan,alice:,bob:$2b$04$xyz,");

        assert_eq!(creds.len(), 1);
        assert!(creds.contains_key("bob"));
    }

    #[test]
    fn test_parse_credentials_empty() {
        assert!(parse_credentials("").is_empty());
    }

    #[test]
    fn test_session_duration() {
        let session = SessionConfig { duration_secs: 1200 };
        assert_eq!(session.duration(), Duration::from_secs(1200));
    }

    #[test]
    fn test_session_duration_parsing() {
        assert_eq!(session_duration_secs(None), 1200);
        assert_eq!(session_duration_secs(Some("30")), 1800);
        assert_eq!(session_duration_secs(Some("45m")), 2700);
        assert_eq!(session_duration_secs(Some("0")), 1200);
        assert_eq!(session_duration_secs(Some("abc")), 1200);
        assert_eq!(session_duration_secs(Some(&u64::MAX.to_string())), 1200);
    }

    #[test]
    fn test_twilio_configured() {
        assert!(!TwilioConfig::default().is_configured());

        let twilio = TwilioConfig {
            account_sid: "AC123".into(),
            auth_token: "token".into(),
            from_number: "+15550000000".into(),
        };
        assert!(twilio.is_configured());
    }
}
