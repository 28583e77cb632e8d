use axum::extract::{Json, Path, State};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    models::{Rsvp, RsvpCreateRequest},
    services::{ServiceError, draft_rsvp},
};

#[axum::debug_handler]
pub async fn create_rsvp(
    State(state): State<AppState>,
    WithRejection(Json(mut req), _): WithRejection<Json<RsvpCreateRequest>, AppError>,
) -> Result<Json<Rsvp>, AppError> {
    // 带邀请码的私人回复，已回复过则直接返回原记录
    if !req.invitation_private_id.is_empty() {
        match state.rsvps.retrieve_private_rsvp(&req.invitation_private_id).await {
            Ok(existing) => return Ok(Json(existing)),
            Err(ServiceError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let rsvp = state.rsvps.create_rsvp(&req).await?;
        return Ok(Json(rsvp));
    }

    // 公开回复需要通过人机验证
    if !state.security.verify_recaptcha(&req.recaptcha_token).await {
        tracing::warn!("guest api - reCAPTCHA verification failed for public rsvp");
        return Err(AppError::BadRequest("reCAPTCHA verification failed".to_string()));
    }

    req.details.guest_count = 1;
    req.invitation_private_id = Uuid::new_v4().to_string();

    let rsvp = state.rsvps.create_rsvp(&req).await?;
    Ok(Json(rsvp))
}

#[axum::debug_handler]
pub async fn get_rsvp(
    State(state): State<AppState>,
    WithRejection(Path(private_id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<Rsvp>, AppError> {
    if private_id.trim().is_empty() {
        return Err(AppError::BadRequest("invitation id is required".to_string()));
    }

    match state.rsvps.retrieve_private_rsvp(&private_id).await {
        Ok(rsvp) => return Ok(Json(rsvp)),
        Err(ServiceError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    // 尚未回复，返回根据邀请预填的草稿
    let invitation = state
        .invitations
        .retrieve_invitation_by_private_id(&private_id)
        .await?;

    Ok(Json(draft_rsvp(&invitation)))
}
