use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: String,
    #[serde(skip_serializing)]
    pub owner_id: i64,
    pub name: String,
    pub course_code: Option<String>,
    pub term_name: Option<String>,
    pub teacher: Option<String>,
    pub dept_name: Option<String>,
    pub pic_url: Option<String>,
    pub description: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseResource {
    pub id: String,
    #[serde(skip_serializing)]
    pub owner_id: i64,
    pub course_id: String,
    pub title: String,
    pub file_type: Option<String>,
    pub file_size: Option<String>,
    pub download_url: Option<String>,
    pub parent_section: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}
