use axum::Json;
use axum::body::Bytes;
use axum::extract::State;

use super::auth::CurrentUser;
use super::credentials::{SyncRequest, parse_optional_json, resolve_credentials};
use super::{DataResponse, SyncResponse};
use crate::db::repository;
use crate::error::AppError;
use crate::models::Notification;
use crate::services::{NotificationSyncService, NotificationSyncStats};
use crate::state::AppState;

pub async fn sync(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Bytes,
) -> Result<Json<SyncResponse<NotificationSyncStats>>, AppError> {
    let request: SyncRequest = parse_optional_json(&body)?;
    let credentials = resolve_credentials(&user, request)?;

    let service = NotificationSyncService::new(state.db.clone(), state.portal.clone());
    let stats = service.sync(user.id, &credentials).await?;

    Ok(Json(SyncResponse::new("Notification sync completed", stats)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DataResponse<Vec<Notification>>>, AppError> {
    let notifications = repository::list_notifications(&state.db, user.id).await?;
    Ok(Json(DataResponse::new(notifications)))
}
