use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::AppError,
    middleware::AuthToken,
    models::{SessionCreateRequest, SessionCreateResponse},
    utils::capitalize,
};

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SessionCreateRequest>, AppError>,
) -> Result<Json<SessionCreateResponse>, AppError> {
    // 用户名不区分大小写
    let username = req.username.trim().to_lowercase();

    if !state.security.verify_recaptcha(&req.recaptcha_token).await {
        tracing::warn!("session api - reCAPTCHA verification failed for {}", username);
        return Err(AppError::BadRequest("reCAPTCHA verification failed".to_string()));
    }

    if !state.security.validate_credentials(&username, &req.password) {
        tracing::warn!("session api - invalid credentials for {}", username);
        return Err(AppError::Unauthorized);
    }

    let auth_token = state.sessions.create_with_expiry(&username).map_err(|e| {
        tracing::error!("session api - unable to create session for {}: {}", username, e);
        AppError::InternalServerError
    })?;

    Ok(Json(SessionCreateResponse {
        username: capitalize(&username),
        auth_token,
    }))
}

#[axum::debug_handler]
pub async fn destroy_session(
    State(state): State<AppState>,
    Extension(AuthToken(token)): Extension<AuthToken>,
) -> StatusCode {
    state.sessions.destroy(&token);
    StatusCode::OK
}
