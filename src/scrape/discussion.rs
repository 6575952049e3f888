use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::{first_non_blank, opt_value_to_i64, opt_value_to_string, parse_time_opt, site_id};
use crate::error::ScrapeError;
use crate::ucloud::{CasCredentials, SchoolPortal, UcloudApi, dto};

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedPost {
    pub id: String,
    pub author_name: Option<String>,
    pub content: Option<String>,
    pub floor: i64,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedTopic {
    pub id: String,
    pub course_id: String,
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub content: Option<String>,
    pub view_count: i64,
    pub reply_count: i64,
    pub like_count: i64,
    pub created_at: Option<NaiveDateTime>,
    pub posts: Vec<ScrapedPost>,
}

impl ScrapedTopic {
    fn from_remote(course_id: &str, id: String, topic: &dto::ForumTopic) -> Self {
        Self {
            id,
            course_id: course_id.to_string(),
            title: first_non_blank([topic.title.as_deref()]),
            author_name: first_non_blank([topic.user_name.as_deref()]),
            content: topic.body.clone(),
            view_count: opt_value_to_i64(topic.view_num.as_ref()).unwrap_or(0),
            reply_count: opt_value_to_i64(topic.reply_num.as_ref()).unwrap_or(0),
            like_count: opt_value_to_i64(topic.like_num.as_ref()).unwrap_or(0),
            created_at: parse_time_opt(topic.create_time.as_ref()),
            posts: Vec::new(),
        }
    }
}

impl ScrapedPost {
    fn from_remote(post: &dto::ForumPost) -> Option<Self> {
        Some(Self {
            id: opt_value_to_string(post.id.as_ref())?,
            author_name: first_non_blank([post.user_name.as_deref()]),
            content: post.body.clone(),
            floor: opt_value_to_i64(post.floor.as_ref()).unwrap_or(1),
            created_at: parse_time_opt(post.create_time.as_ref()),
        })
    }
}

pub async fn run(
    portal: &dyn SchoolPortal,
    credentials: &CasCredentials,
) -> Result<Vec<ScrapedTopic>, ScrapeError> {
    let api = portal.login(credentials).await?;
    Ok(collect(api.as_ref()).await)
}

pub async fn collect(api: &dyn UcloudApi) -> Vec<ScrapedTopic> {
    let course_ids: Vec<String> = match api.current_courses().await {
        Ok(courses) => courses
            .iter()
            .filter_map(site_id)
            .collect(),
        Err(e) => {
            warn!("Failed to fetch course list: {}", e);
            return Vec::new();
        }
    };
    info!("Fetching discussions for {} courses", course_ids.len());

    let mut topics = Vec::new();
    for course_id in &course_ids {
        let remote_topics = match api.forum_topics(course_id).await {
            Ok(topics) => topics,
            Err(e) => {
                warn!("Failed to fetch topics for course {}: {}", course_id, e);
                continue;
            }
        };

        for remote in &remote_topics {
            let Some(topic_id) = opt_value_to_string(remote.id.as_ref()) else {
                continue;
            };
            let mut topic = ScrapedTopic::from_remote(course_id, topic_id, remote);

            match api.topic_posts(&topic.id).await {
                Ok(posts) => {
                    topic.posts = posts.iter().filter_map(ScrapedPost::from_remote).collect();
                }
                Err(e) => warn!("Failed to fetch posts for topic {}: {}", topic.id, e),
            }

            debug!(
                course_id = %topic.course_id,
                posts = topic.posts.len(),
                "topic {}",
                topic.id
            );
            topics.push(topic);
        }
    }

    topics
}
