use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::AppError,
    models::{Category, CategoryCreateRequest, CategoryUpdateRequest},
};

#[axum::debug_handler]
pub async fn create_category(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CategoryCreateRequest>, AppError>,
) -> Result<Json<Category>, AppError> {
    let category = state.categories.create_category(&req).await?;
    Ok(Json(category))
}

#[axum::debug_handler]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.categories.list_categories().await?;
    Ok(Json(categories))
}

#[axum::debug_handler]
pub async fn update_category(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<CategoryUpdateRequest>, AppError>,
) -> Result<Json<Category>, AppError> {
    if req.id != id {
        tracing::warn!("category api - path id {} does not match request id {}", id, req.id);
        return Err(AppError::BadRequest("category id does not match".to_string()));
    }

    let category = state.categories.update_category(&req).await?;
    Ok(Json(category))
}

#[axum::debug_handler]
pub async fn delete_category(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    state.categories.delete_category(id).await?;
    Ok(StatusCode::OK)
}
