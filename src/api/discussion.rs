use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::auth::CurrentUser;
use super::credentials::{SyncRequest, parse_optional_json, resolve_credentials};
use super::{DataResponse, SyncResponse};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{DiscussionTopic, TopicDetail};
use crate::services::{DiscussionSyncService, DiscussionSyncStats};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TopicListParams {
    pub course_id: Option<String>,
}

pub async fn sync(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Bytes,
) -> Result<Json<SyncResponse<DiscussionSyncStats>>, AppError> {
    let request: SyncRequest = parse_optional_json(&body)?;
    let credentials = resolve_credentials(&user, request)?;

    let service = DiscussionSyncService::new(state.db.clone(), state.portal.clone());
    let stats = service.sync(user.id, &credentials).await?;

    Ok(Json(SyncResponse::new("Discussion sync completed", stats)))
}

pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<TopicListParams>,
) -> Result<Json<DataResponse<Vec<DiscussionTopic>>>, AppError> {
    let course_id = params
        .course_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing course_id".to_string()))?;

    let topics = repository::list_topics(&state.db, &course_id).await?;
    Ok(Json(DataResponse::new(topics)))
}

pub async fn detail(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(topic_id): Path<String>,
) -> Result<Json<DataResponse<TopicDetail>>, AppError> {
    let topic = repository::get_topic(&state.db, &topic_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let posts = repository::list_posts(&state.db, &topic_id).await?;
    Ok(Json(DataResponse::new(TopicDetail { topic, posts })))
}
