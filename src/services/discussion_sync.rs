use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::scrape::{self, discussion::ScrapedTopic};
use crate::ucloud::{CasCredentials, SchoolPortal};

pub struct DiscussionSyncService {
    db: SqlitePool,
    portal: Arc<dyn SchoolPortal>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DiscussionSyncStats {
    pub total_topics: usize,
    pub new_topics: usize,
    pub updated_topics: usize,
    pub total_posts_found: usize,
    pub new_posts_added: usize,
}

impl DiscussionSyncService {
    pub fn new(db: SqlitePool, portal: Arc<dyn SchoolPortal>) -> Self {
        Self { db, portal }
    }

    pub async fn sync(
        &self,
        owner_id: i64,
        credentials: &CasCredentials,
    ) -> Result<DiscussionSyncStats, AppError> {
        info!("Starting discussion sync for user {}", owner_id);

        info!("Step 1: Scraping forum topics and replies");
        let topics = scrape::discussion::run(self.portal.as_ref(), credentials).await?;

        info!("Step 2: Reconciling {} topics", topics.len());
        let stats = self.store(&topics).await?;

        info!("Discussion sync completed: {:?}", stats);
        Ok(stats)
    }

    /// Topic counters are refreshed; replies are only ever added.
    async fn store(&self, topics: &[ScrapedTopic]) -> Result<DiscussionSyncStats, AppError> {
        let mut stats = DiscussionSyncStats {
            total_topics: topics.len(),
            ..Default::default()
        };

        let mut tx = self.db.begin().await?;
        for topic in topics {
            match repository::find_topic(&mut tx, &topic.id).await? {
                None => {
                    repository::insert_topic(&mut tx, topic).await?;
                    stats.new_topics += 1;
                }
                Some(existing)
                    if existing.view_count != topic.view_count
                        || existing.reply_count != topic.reply_count
                        || existing.like_count != topic.like_count =>
                {
                    repository::update_topic_counters(&mut tx, topic).await?;
                    stats.updated_topics += 1;
                }
                Some(_) => {}
            }

            for post in &topic.posts {
                stats.total_posts_found += 1;
                if !repository::post_exists(&mut tx, &post.id).await? {
                    repository::insert_post(&mut tx, &topic.id, post).await?;
                    stats.new_posts_added += 1;
                }
            }
        }
        tx.commit().await?;

        Ok(stats)
    }
}
