use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// Forum topics are keyed by their remote id and shared by everyone
/// enrolled in the course.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DiscussionTopic {
    pub id: String,
    pub course_id: String,
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub content: Option<String>,
    pub view_count: i64,
    pub reply_count: i64,
    pub like_count: i64,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DiscussionPost {
    pub id: String,
    pub topic_id: String,
    pub author_name: Option<String>,
    pub content: Option<String>,
    pub floor: i64,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicDetail {
    pub topic: DiscussionTopic,
    pub posts: Vec<DiscussionPost>,
}
