use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheError, CacheStore};
use crate::config::SessionConfig;

use super::token::{TokenError, TokenService, USERNAME_CLAIM};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("session service failure")]
    General,
}

/// 会话管理
///
/// 令牌本身无状态，缓存中以用户名为键保存当前令牌。校验时令牌必须可解析，
/// 且其用户名仍在缓存中，删除缓存条目即可提前撤销会话。
pub struct SessionManager {
    config: SessionConfig,
    tokens: Arc<TokenService>,
    cache: Arc<dyn CacheStore>,
}

impl SessionManager {
    pub fn new(config: SessionConfig, tokens: Arc<TokenService>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            config,
            tokens,
            cache,
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn create_with_expiry(&self, username: &str) -> Result<String, SessionError> {
        let duration = self.config.duration();
        let claims = HashMap::from([(USERNAME_CLAIM.to_string(), username.to_string())]);

        let token = self.tokens.generate_auth_token(&claims, duration).map_err(|e| {
            tracing::error!("session - unable to generate token: {}", e);
            e
        })?;

        // 用户名作为键，重新登录会覆盖旧令牌并刷新有效期
        self.cache
            .set_with_expiry(username, &token, duration)
            .map_err(|e| {
                tracing::error!("session - unable to cache session: {}", e);
                e
            })?;

        tracing::info!("session - created session for {}", username);
        Ok(token)
    }

    #[tracing::instrument(skip_all)]
    pub fn is_session_valid(&self, token: &str) -> Result<bool, SessionError> {
        let claims = match self.tokens.parse_token(token) {
            Ok(claims) => claims,
            Err(TokenError::Invalid) => return Ok(false),
            Err(e) => {
                tracing::error!("session - unable to parse token: {}", e);
                return Err(SessionError::General);
            }
        };

        let Some(username) = claims.username() else {
            tracing::error!("session - token has no {} claim", USERNAME_CLAIM);
            return Ok(false);
        };

        self.cache.exists(username).map_err(|e| {
            tracing::error!("session - unable to look up session for {}: {}", username, e);
            SessionError::General
        })
    }

    /// 注销会话，令牌无效或缓存失败时同样视为完成
    #[tracing::instrument(skip_all)]
    pub fn destroy(&self, token: &str) {
        let claims = match self.tokens.parse_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("session - destroy called with unusable token: {}", e);
                return;
            }
        };

        let Some(username) = claims.username() else {
            tracing::warn!("session - destroy called with token lacking {} claim", USERNAME_CLAIM);
            return;
        };

        match self.cache.delete(username) {
            Ok(()) => tracing::info!("session - destroyed session for {}", username),
            Err(e) => tracing::error!("session - unable to remove session for {}: {}", username, e),
        }
    }
}
