use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::AppError,
    models::{Invitation, InvitationCreateRequest, InvitationSmsRequest, InvitationUpdateRequest},
    services::has_phone_number,
};

fn invitation_message(invitation: &Invitation, link_base: &str) -> String {
    format!(
        "Dear {}, you are cordially invited! Please find the RSVP form and further details at {}{}",
        invitation.details.greeting, link_base, invitation.private_id
    )
}

#[axum::debug_handler]
pub async fn send_invitation(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<InvitationSmsRequest>, AppError>,
) -> Result<StatusCode, AppError> {
    let invitation = state
        .invitations
        .retrieve_invitation_by_private_id(&req.private_id)
        .await?;

    if !has_phone_number(&invitation) {
        tracing::warn!("invitation api - invitation {} has no mobile phone number", invitation.id);
        return Err(AppError::BadRequest(
            "invitation has no mobile phone number".to_string(),
        ));
    }

    let message = invitation_message(&invitation, &state.config.rsvp_link_base);
    state
        .sms
        .send_sms(&invitation.details.mobile_phone_number, &message)
        .await
        .map_err(|e| {
            tracing::error!("invitation api - unable to send invitation {}: {}", invitation.id, e);
            AppError::InternalServerError
        })?;

    Ok(StatusCode::OK)
}

#[axum::debug_handler]
pub async fn create_invitation(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<InvitationCreateRequest>, AppError>,
) -> Result<Json<Invitation>, AppError> {
    let invitation = state.invitations.create_invitation(&req).await?;
    Ok(Json(invitation))
}

#[axum::debug_handler]
pub async fn list_invitations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Invitation>>, AppError> {
    let rsvps = state.rsvps.list_rsvps().await?;
    let invitations = state.invitations.list_invitations(&rsvps).await?;
    Ok(Json(invitations))
}

#[axum::debug_handler]
pub async fn update_invitation(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<InvitationUpdateRequest>, AppError>,
) -> Result<Json<Invitation>, AppError> {
    if req.id != id {
        tracing::warn!("invitation api - path id {} does not match request id {}", id, req.id);
        return Err(AppError::BadRequest("invitation id does not match".to_string()));
    }

    let invitation = state.invitations.update_invitation(&req).await?;
    Ok(Json(invitation))
}

#[axum::debug_handler]
pub async fn delete_invitation(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    state.invitations.delete_invitation(id).await?;
    Ok(StatusCode::OK)
}
