use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::scrape::{self, notification::ScrapedNotification};
use crate::ucloud::{CasCredentials, SchoolPortal};

pub struct NotificationSyncService {
    db: SqlitePool,
    portal: Arc<dyn SchoolPortal>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationSyncStats {
    pub total: usize,
    pub added: usize,
    pub updated: usize,
}

impl NotificationSyncService {
    pub fn new(db: SqlitePool, portal: Arc<dyn SchoolPortal>) -> Self {
        Self { db, portal }
    }

    pub async fn sync(
        &self,
        owner_id: i64,
        credentials: &CasCredentials,
    ) -> Result<NotificationSyncStats, AppError> {
        info!("Starting notification sync for user {}", owner_id);

        info!("Step 1: Paging through notifications");
        let items = scrape::notification::run(self.portal.as_ref(), credentials).await?;

        info!("Step 2: Reconciling {} notifications", items.len());
        let stats = self.store(owner_id, &items).await?;

        info!("Notification sync completed: {:?}", stats);
        Ok(stats)
    }

    async fn store(
        &self,
        owner_id: i64,
        items: &[ScrapedNotification],
    ) -> Result<NotificationSyncStats, AppError> {
        let mut stats = NotificationSyncStats {
            total: items.len(),
            ..Default::default()
        };

        let mut tx = self.db.begin().await?;
        for item in items {
            match repository::find_notification(&mut tx, owner_id, &item.id).await? {
                None => {
                    repository::insert_notification(&mut tx, owner_id, item).await?;
                    stats.added += 1;
                }
                Some(existing) if existing.is_read != item.is_read => {
                    repository::update_notification_read(&mut tx, owner_id, &item.id, item.is_read)
                        .await?;
                    stats.updated += 1;
                }
                Some(_) => {}
            }
        }
        tx.commit().await?;

        Ok(stats)
    }
}
