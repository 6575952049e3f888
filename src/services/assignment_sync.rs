use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::repository;
use crate::error::AppError;
use crate::models::Assignment;
use crate::scrape::{self, assignment::ScrapedAssignment};
use crate::ucloud::{CasCredentials, SchoolPortal};

pub struct AssignmentSyncService {
    db: SqlitePool,
    portal: Arc<dyn SchoolPortal>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentSyncStats {
    pub total_fetched: usize,
    pub new_added: usize,
    pub updated: usize,
}

impl AssignmentSyncService {
    pub fn new(db: SqlitePool, portal: Arc<dyn SchoolPortal>) -> Self {
        Self { db, portal }
    }

    pub async fn sync(
        &self,
        owner_id: i64,
        credentials: &CasCredentials,
    ) -> Result<AssignmentSyncStats, AppError> {
        info!("Starting assignment sync for user {}", owner_id);

        info!("Step 1: Scraping assignments");
        let items = scrape::assignment::run(self.portal.as_ref(), credentials).await?;

        info!("Step 2: Reconciling {} assignments", items.len());
        let stats = self.store(owner_id, &items).await?;

        info!("Assignment sync completed: {:?}", stats);
        Ok(stats)
    }

    async fn store(
        &self,
        owner_id: i64,
        items: &[ScrapedAssignment],
    ) -> Result<AssignmentSyncStats, AppError> {
        let mut stats = AssignmentSyncStats {
            total_fetched: items.len(),
            ..Default::default()
        };

        let mut tx = self.db.begin().await?;
        for item in items {
            let existing = repository::find_assignment_by_key(
                &mut tx,
                owner_id,
                &item.course_name,
                &item.title,
            )
            .await?;
            match existing {
                None => {
                    repository::insert_assignment(&mut tx, owner_id, item).await?;
                    stats.new_added += 1;
                }
                Some(existing) if has_changed(&existing, item) => {
                    debug!("Assignment changed: {} / {}", item.course_name, item.title);
                    repository::update_assignment(&mut tx, existing.id, item).await?;
                    stats.updated += 1;
                }
                Some(_) => {}
            }
        }
        tx.commit().await?;

        Ok(stats)
    }
}

fn has_changed(existing: &Assignment, item: &ScrapedAssignment) -> bool {
    existing.is_submitted != item.is_submitted
        || existing.score != item.score
        || existing.description.as_deref().unwrap_or_default() != item.description
        || existing.deadline != item.deadline
}
