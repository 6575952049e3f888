pub mod assignment;
pub mod auth;
pub mod course;
pub mod credentials;
pub mod discussion;
pub mod notification;
pub mod user;

use axum::routing::{get, post};
use axum::{Router, extract::State, http::StatusCode};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Standard envelope for list and detail responses.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncResponse<S> {
    pub msg: String,
    pub stats: S,
}

impl<S> SyncResponse<S> {
    pub fn new(msg: &str, stats: S) -> Self {
        Self {
            msg: msg.to_string(),
            stats,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/user/register", post(user::register))
        .route("/api/user/login", post(user::login))
        .route(
            "/api/user/me",
            get(user::me)
                .put(user::update_me)
                .patch(user::update_me)
                .delete(user::delete_me),
        )
        .route("/api/user/change-password", post(user::change_password))
        .route("/api/user/cas/bind", post(user::bind_cas))
        .route("/api/user/cas/unbind", post(user::unbind_cas))
        .route("/api/assignment/sync", post(assignment::sync))
        .route("/api/assignment", get(assignment::list))
        .route("/api/assignment/{id}", get(assignment::detail))
        .route("/api/course/sync", post(course::sync))
        .route("/api/course", get(course::list))
        .route("/api/course/{id}", get(course::detail))
        .route("/api/course/{id}/resources", get(course::resources))
        .route("/api/discussion/sync", post(discussion::sync))
        .route("/api/discussion/list", get(discussion::list))
        .route("/api/discussion/{topic_id}", get(discussion::detail))
        .route("/api/notification/sync", post(notification::sync))
        .route("/api/notification", get(notification::list))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
