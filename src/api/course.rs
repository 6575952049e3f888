use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};

use super::auth::CurrentUser;
use super::credentials::{SyncRequest, parse_optional_json, resolve_credentials};
use super::{DataResponse, SyncResponse};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, CourseResource};
use crate::services::{CourseSyncService, CourseSyncStats};
use crate::state::AppState;

pub async fn sync(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Bytes,
) -> Result<Json<SyncResponse<CourseSyncStats>>, AppError> {
    let request: SyncRequest = parse_optional_json(&body)?;
    let credentials = resolve_credentials(&user, request)?;

    let service = CourseSyncService::new(state.db.clone(), state.portal.clone());
    let stats = service.sync(user.id, &credentials).await?;

    Ok(Json(SyncResponse::new("Course sync completed", stats)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DataResponse<Vec<Course>>>, AppError> {
    let courses = repository::list_courses(&state.db, user.id).await?;
    Ok(Json(DataResponse::new(courses)))
}

pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Course>>, AppError> {
    let course = repository::get_course(&state.db, user.id, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(DataResponse::new(course)))
}

pub async fn resources(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Vec<CourseResource>>>, AppError> {
    if repository::get_course(&state.db, user.id, &id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    let resources = repository::list_course_resources(&state.db, user.id, &id).await?;
    Ok(Json(DataResponse::new(resources)))
}
