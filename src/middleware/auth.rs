use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError};

pub const AUTH_HEADER: &str = "X-Auth-Header";

/// 通过校验的令牌，放入请求扩展供后续处理器使用
#[derive(Debug, Clone)]
pub struct AuthToken(pub String);

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTH_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned);

    let Some(token) = token else {
        tracing::warn!("Request to {} without auth header", request.uri().path());
        return Err(AppError::Unauthorized);
    };

    match state.sessions.is_session_valid(&token) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("Request to {} with invalid session", request.uri().path());
            return Err(AppError::Unauthorized);
        }
        Err(e) => {
            tracing::error!("Unable to check session: {}", e);
            return Err(AppError::InternalServerError);
        }
    }

    request.extensions_mut().insert(AuthToken(token));
    Ok(next.run(request).await)
}
