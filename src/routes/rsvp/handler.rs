use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::AppError,
    models::{Rsvp, RsvpCreateRequest, RsvpUpdateRequest},
};

#[axum::debug_handler]
pub async fn create_rsvp(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RsvpCreateRequest>, AppError>,
) -> Result<Json<Rsvp>, AppError> {
    let rsvp = state.rsvps.create_rsvp(&req).await?;
    Ok(Json(rsvp))
}

#[axum::debug_handler]
pub async fn list_rsvps(State(state): State<AppState>) -> Result<Json<Vec<Rsvp>>, AppError> {
    let rsvps = state.rsvps.list_rsvps().await?;
    Ok(Json(rsvps))
}

#[axum::debug_handler]
pub async fn update_rsvp(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<RsvpUpdateRequest>, AppError>,
) -> Result<Json<Rsvp>, AppError> {
    if req.id != id {
        tracing::warn!("rsvp api - path id {} does not match request id {}", id, req.id);
        return Err(AppError::BadRequest("rsvp id does not match".to_string()));
    }

    let rsvp = state.rsvps.update_rsvp(&req).await?;
    Ok(Json(rsvp))
}

#[axum::debug_handler]
pub async fn delete_rsvp(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    state.rsvps.delete_rsvp(id).await?;
    Ok(StatusCode::OK)
}
