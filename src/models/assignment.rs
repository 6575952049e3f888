use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Assignment {
    pub id: i64,
    #[serde(skip_serializing)]
    pub owner_id: i64,
    pub course_name: String,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<NaiveDateTime>,
    pub is_submitted: bool,
    pub score: String,
    pub created_at: DateTime<Utc>,
}
