use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::{first_non_blank, opt_value_to_string, parse_time_opt, site_id};
use crate::error::ScrapeError;
use crate::ucloud::{CasCredentials, SchoolPortal, UcloudApi, dto};

pub const UNKNOWN_SECTION: &str = "Unknown section";

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedResource {
    pub resource_id: String,
    pub title: String,
    pub file_type: Option<String>,
    pub file_size: Option<String>,
    pub download_url: Option<String>,
    pub parent_section: String,
    pub upload_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedCourse {
    pub site_id: String,
    pub name: String,
    pub course_code: Option<String>,
    pub term_name: Option<String>,
    pub teacher_name: Option<String>,
    pub dept_name: Option<String>,
    pub pic_url: Option<String>,
    pub description: Option<String>,
    pub resources: Vec<ScrapedResource>,
}

pub async fn run(
    portal: &dyn SchoolPortal,
    credentials: &CasCredentials,
) -> Result<Vec<ScrapedCourse>, ScrapeError> {
    let api = portal.login(credentials).await?;
    Ok(collect(api.as_ref()).await)
}

pub async fn collect(api: &dyn UcloudApi) -> Vec<ScrapedCourse> {
    let raw_courses = match api.current_courses().await {
        Ok(courses) => courses,
        Err(e) => {
            warn!("Failed to fetch course list: {}", e);
            return Vec::new();
        }
    };
    info!("Fetched {} courses", raw_courses.len());

    let mut courses = Vec::with_capacity(raw_courses.len());
    for raw in &raw_courses {
        let Some(site_id) = site_id(raw) else {
            continue;
        };

        let mut description = first_non_blank([raw.brief_introduction.as_deref()]);
        if description.is_none() {
            description = fetch_description(api, &site_id).await;
        }

        let resources = fetch_resources(api, &site_id).await;

        let course = ScrapedCourse {
            name: first_non_blank([raw.site_name.as_deref(), raw.name.as_deref()])
                .unwrap_or_else(|| site_id.clone()),
            course_code: first_non_blank([raw.course_code.as_deref()]),
            term_name: first_non_blank([raw.term_name.as_deref()]),
            teacher_name: teacher_name(raw),
            dept_name: first_non_blank([raw.department_name.as_deref()]),
            pic_url: first_non_blank([raw.pic_url.as_deref()]),
            description,
            resources,
            site_id,
        };
        debug!(
            site_id = %course.site_id,
            resources = course.resources.len(),
            "{}",
            course.name
        );
        courses.push(course);
    }

    courses
}

/// First listed teacher, else the flat `teacherName`.
fn teacher_name(raw: &dto::SiteRecord) -> Option<String> {
    first_non_blank([
        raw.teachers.first().and_then(|t| t.name.as_deref()),
        raw.teacher_name.as_deref(),
    ])
}

async fn fetch_description(api: &dyn UcloudApi, site_id: &str) -> Option<String> {
    match api.course_detail(site_id).await {
        Ok(detail) => detail.and_then(|d| {
            first_non_blank([d.brief_introduction.as_deref(), d.introduction.as_deref()])
        }),
        Err(e) => {
            warn!("Failed to fetch course detail {}: {}", site_id, e);
            None
        }
    }
}

async fn fetch_resources(api: &dyn UcloudApi, site_id: &str) -> Vec<ScrapedResource> {
    match api.course_resource_tree(site_id).await {
        Ok(nodes) => flatten_resource_tree(&nodes),
        Err(e) => {
            warn!("Failed to fetch resources for {}: {}", site_id, e);
            Vec::new()
        }
    }
}

/// Chapters hold attachments; each attachment becomes one resource tagged
/// with its chapter name. Attachments without an id are dropped.
pub fn flatten_resource_tree(nodes: &[dto::ResourceNode]) -> Vec<ScrapedResource> {
    let mut resources = Vec::new();
    for node in nodes {
        let section = first_non_blank([node.resource_name.as_deref()])
            .unwrap_or_else(|| UNKNOWN_SECTION.to_string());

        for file in node.attachment_vos.iter().filter_map(|a| a.resource.as_ref()) {
            let Some(resource_id) = opt_value_to_string(file.id.as_ref()) else {
                continue;
            };
            resources.push(ScrapedResource {
                title: first_non_blank([file.name.as_deref()])
                    .unwrap_or_else(|| resource_id.clone()),
                resource_id,
                file_type: first_non_blank([file.ext.as_deref()]),
                file_size: first_non_blank([file.file_size_unit.as_deref()]),
                download_url: first_non_blank([file.url.as_deref()]),
                parent_section: section.clone(),
                upload_time: parse_time_opt(file.create_time.as_ref()),
            });
        }
    }
    resources
}
