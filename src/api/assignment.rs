use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};

use super::auth::CurrentUser;
use super::credentials::{SyncRequest, parse_optional_json, resolve_credentials};
use super::{DataResponse, SyncResponse};
use crate::db::repository;
use crate::error::AppError;
use crate::models::Assignment;
use crate::services::{AssignmentSyncService, AssignmentSyncStats};
use crate::state::AppState;

pub async fn sync(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Bytes,
) -> Result<Json<SyncResponse<AssignmentSyncStats>>, AppError> {
    let request: SyncRequest = parse_optional_json(&body)?;
    let credentials = resolve_credentials(&user, request)?;

    let service = AssignmentSyncService::new(state.db.clone(), state.portal.clone());
    let stats = service.sync(user.id, &credentials).await?;

    Ok(Json(SyncResponse::new("Assignment sync completed", stats)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DataResponse<Vec<Assignment>>>, AppError> {
    let assignments = repository::list_assignments(&state.db, user.id).await?;
    Ok(Json(DataResponse::new(assignments)))
}

pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<DataResponse<Assignment>>, AppError> {
    let assignment = repository::get_assignment(&state.db, user.id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(DataResponse::new(assignment)))
}
