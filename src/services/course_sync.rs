use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, CourseResource};
use crate::scrape::{self, course::{ScrapedCourse, ScrapedResource}};
use crate::ucloud::{CasCredentials, SchoolPortal};

pub struct CourseSyncService {
    db: SqlitePool,
    portal: Arc<dyn SchoolPortal>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSyncStats {
    pub total_courses: usize,
    pub new_courses: usize,
    pub updated_courses: usize,
    pub total_resources_found: usize,
    pub new_resources_added: usize,
    pub updated_resources: usize,
}

impl CourseSyncService {
    pub fn new(db: SqlitePool, portal: Arc<dyn SchoolPortal>) -> Self {
        Self { db, portal }
    }

    pub async fn sync(
        &self,
        owner_id: i64,
        credentials: &CasCredentials,
    ) -> Result<CourseSyncStats, AppError> {
        info!("Starting course sync for user {}", owner_id);

        info!("Step 1: Scraping courses and resources");
        let courses = scrape::course::run(self.portal.as_ref(), credentials).await?;

        info!("Step 2: Reconciling {} courses", courses.len());
        let stats = self.store(owner_id, &courses).await?;

        info!("Course sync completed: {:?}", stats);
        Ok(stats)
    }

    async fn store(
        &self,
        owner_id: i64,
        courses: &[ScrapedCourse],
    ) -> Result<CourseSyncStats, AppError> {
        let mut stats = CourseSyncStats {
            total_courses: courses.len(),
            ..Default::default()
        };
        let mut seen_resources = HashSet::new();

        let mut tx = self.db.begin().await?;
        for course in courses {
            match repository::find_course(&mut tx, owner_id, &course.site_id).await? {
                None => {
                    repository::insert_course(&mut tx, owner_id, course).await?;
                    stats.new_courses += 1;
                }
                Some(existing) if course_changed(&existing, course) => {
                    debug!("Course changed: {}", course.name);
                    repository::update_course(&mut tx, owner_id, course).await?;
                    stats.updated_courses += 1;
                }
                Some(_) => {}
            }

            for resource in &course.resources {
                // The same file can hang under several chapters.
                if !seen_resources.insert(resource.resource_id.clone()) {
                    continue;
                }
                stats.total_resources_found += 1;

                match repository::find_resource(&mut tx, owner_id, &resource.resource_id).await? {
                    None => {
                        repository::insert_resource(&mut tx, owner_id, &course.site_id, resource)
                            .await?;
                        stats.new_resources_added += 1;
                    }
                    Some(existing) if resource_changed(&existing, &course.site_id, resource) => {
                        repository::update_resource(&mut tx, owner_id, &course.site_id, resource)
                            .await?;
                        stats.updated_resources += 1;
                    }
                    Some(_) => {}
                }
            }
        }
        tx.commit().await?;

        Ok(stats)
    }
}

fn course_changed(existing: &Course, course: &ScrapedCourse) -> bool {
    existing.name != course.name
        || existing.course_code != course.course_code
        || existing.term_name != course.term_name
        || existing.teacher != course.teacher_name
        || existing.dept_name != course.dept_name
        || existing.pic_url != course.pic_url
        || existing.description != course.description
}

fn resource_changed(
    existing: &CourseResource,
    course_id: &str,
    resource: &ScrapedResource,
) -> bool {
    existing.course_id != course_id
        || existing.title != resource.title
        || existing.file_type != resource.file_type
        || existing.file_size != resource.file_size
        || existing.download_url != resource.download_url
        || existing.parent_section.as_deref() != Some(resource.parent_section.as_str())
        || existing.created_at != resource.upload_time
}
