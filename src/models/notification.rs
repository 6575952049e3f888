use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: String,
    #[serde(skip_serializing)]
    pub owner_id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub msg_type: Option<String>,
    pub is_read: bool,
    pub publish_time: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
}
