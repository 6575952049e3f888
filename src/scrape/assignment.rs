use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{first_non_blank, opt_value_to_string, parse_time_opt, site_id};
use crate::error::ScrapeError;
use crate::ucloud::{CasCredentials, SchoolPortal, UcloudApi, dto};

/// Course name given to to-do items the portal returns without a site.
pub const UNCATEGORIZED_COURSE: &str = "Uncategorized";
pub const UNTITLED_ASSIGNMENT: &str = "Untitled assignment";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedAssignment {
    pub course_name: String,
    pub title: String,
    pub description: String,
    pub deadline: Option<NaiveDateTime>,
    pub is_submitted: bool,
    pub score: String,
}

impl ScrapedAssignment {
    fn key(&self) -> (String, String) {
        (self.course_name.clone(), self.title.clone())
    }

    fn from_undone(item: &dto::UndoneItem) -> Self {
        Self {
            course_name: first_non_blank([item.site_name.as_deref()])
                .unwrap_or_else(|| UNCATEGORIZED_COURSE.to_string()),
            title: first_non_blank([item.activity_name.as_deref()])
                .unwrap_or_else(|| UNTITLED_ASSIGNMENT.to_string()),
            description: String::new(),
            deadline: parse_time_opt(item.end_time.as_ref()),
            is_submitted: false,
            score: String::new(),
        }
    }

    fn from_work(course_name: &str, record: &dto::WorkRecord) -> Self {
        let is_submitted = record
            .submit_time
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());

        Self {
            course_name: course_name.to_string(),
            title: first_non_blank([record.assignment_title.as_deref(), record.title.as_deref()])
                .unwrap_or_else(|| UNTITLED_ASSIGNMENT.to_string()),
            description: record.description.clone().unwrap_or_default(),
            deadline: parse_time_opt(record.assignment_end_time.as_ref()),
            is_submitted,
            score: opt_value_to_string(record.score.as_ref()).unwrap_or_default(),
        }
    }
}

/// Merges to-do items and per-course assignment lists, keyed by
/// `(course_name, title)`.
#[derive(Debug, Default)]
pub struct AssignmentMerger {
    items: Vec<ScrapedAssignment>,
    index: HashMap<(String, String), usize>,
}

impl AssignmentMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// To-do items only ever add; the first occurrence of a key wins.
    pub fn push_todo(&mut self, item: ScrapedAssignment) {
        let key = item.key();
        if !self.index.contains_key(&key) {
            self.index.insert(key, self.items.len());
            self.items.push(item);
        }
    }

    /// Course-level records carry the authoritative submission state and
    /// score. A to-do item that had no course name is adopted by the first
    /// course record with the same title.
    pub fn push_course_item(&mut self, item: ScrapedAssignment) {
        if let Some(&pos) = self.index.get(&item.key()) {
            let existing = &mut self.items[pos];
            existing.is_submitted = item.is_submitted;
            existing.score = item.score;
            return;
        }

        let orphan_key = (UNCATEGORIZED_COURSE.to_string(), item.title.clone());
        if let Some(pos) = self.index.remove(&orphan_key) {
            let key = item.key();
            let existing = &mut self.items[pos];
            existing.course_name = item.course_name;
            existing.is_submitted = item.is_submitted;
            existing.score = item.score;
            if existing.description.is_empty() {
                existing.description = item.description;
            }
            if existing.deadline.is_none() {
                existing.deadline = item.deadline;
            }
            self.index.insert(key, pos);
            return;
        }

        self.index.insert(item.key(), self.items.len());
        self.items.push(item);
    }

    pub fn into_items(self) -> Vec<ScrapedAssignment> {
        self.items
    }
}

/// Logs in and collects every assignment visible to the account.
pub async fn run(
    portal: &dyn SchoolPortal,
    credentials: &CasCredentials,
) -> Result<Vec<ScrapedAssignment>, ScrapeError> {
    let api = portal.login(credentials).await?;
    Ok(collect(api.as_ref()).await)
}

pub async fn collect(api: &dyn UcloudApi) -> Vec<ScrapedAssignment> {
    let mut merger = AssignmentMerger::new();

    match api.undone_assignments().await {
        Ok(undone) => {
            info!("Fetched {} to-do assignments", undone.len());
            for item in &undone {
                merger.push_todo(ScrapedAssignment::from_undone(item));
            }
        }
        Err(e) => warn!("Failed to fetch to-do assignments: {}", e),
    }

    let courses = match api.current_courses().await {
        Ok(courses) => courses,
        Err(e) => {
            warn!("Failed to fetch course list: {}", e);
            Vec::new()
        }
    };
    info!("Walking {} courses for assignments", courses.len());

    for course in &courses {
        let Some(site_id) = site_id(course) else {
            continue;
        };
        let course_name = first_non_blank([course.name.as_deref(), course.site_name.as_deref()])
            .unwrap_or_else(|| site_id.clone());

        match api.course_assignments(&site_id).await {
            Ok(records) => {
                debug!("{} assignments in {}", records.len(), course_name);
                for record in &records {
                    merger.push_course_item(ScrapedAssignment::from_work(&course_name, record));
                }
            }
            Err(e) => warn!("Failed to fetch assignments for {}: {}", course_name, e),
        }
    }

    let items = merger.into_items();
    for item in &items {
        debug!(
            course = %item.course_name,
            submitted = item.is_submitted,
            score = %item.score,
            "{}",
            item.title
        );
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(course: &str, title: &str, submitted: bool, score: &str) -> ScrapedAssignment {
        ScrapedAssignment {
            course_name: course.to_string(),
            title: title.to_string(),
            description: String::new(),
            deadline: None,
            is_submitted: submitted,
            score: score.to_string(),
        }
    }

    #[test]
    fn first_todo_wins() {
        let mut merger = AssignmentMerger::new();
        merger.push_todo(assignment("Python", "Lab 1", false, ""));
        merger.push_todo(assignment("Python", "Lab 1", true, "90"));

        let items = merger.into_items();
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_submitted);
    }

    #[test]
    fn course_record_overrides_status_and_score() {
        let mut merger = AssignmentMerger::new();
        merger.push_todo(assignment("Python", "Lab 1", false, ""));
        merger.push_course_item(assignment("Python", "Lab 1", true, "95"));
        merger.push_course_item(assignment("Python", "Lab 2", false, ""));

        let items = merger.into_items();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_submitted);
        assert_eq!(items[0].score, "95");
        assert_eq!(items[1].title, "Lab 2");
    }

    #[test]
    fn uncategorized_todo_is_adopted_by_course() {
        let mut merger = AssignmentMerger::new();
        let mut orphan = assignment(UNCATEGORIZED_COURSE, "Essay", false, "");
        orphan.description = String::new();
        merger.push_todo(orphan);

        let mut from_course = assignment("Writing", "Essay", false, "");
        from_course.description = "500 words".to_string();
        merger.push_course_item(from_course);
        // Later duplicates now match the real key.
        merger.push_course_item(assignment("Writing", "Essay", true, "A"));

        let items = merger.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].course_name, "Writing");
        assert_eq!(items[0].description, "500 words");
        assert!(items[0].is_submitted);
        assert_eq!(items[0].score, "A");
    }

    #[test]
    fn work_record_maps_submission_and_title_fallbacks() {
        let record = dto::WorkRecord {
            assignment_title: None,
            title: Some("Report".to_string()),
            submit_time: Some("  ".to_string()),
            score: Some(serde_json::json!(88)),
            ..Default::default()
        };

        let item = ScrapedAssignment::from_work("Physics", &record);
        assert_eq!(item.title, "Report");
        assert!(!item.is_submitted);
        assert_eq!(item.score, "88");
    }

    #[test]
    fn graded_zero_keeps_its_score() {
        let record = dto::WorkRecord {
            title: Some("Quiz".to_string()),
            submit_time: Some("2026-01-10 12:00".to_string()),
            score: Some(serde_json::json!(0)),
            ..Default::default()
        };

        let item = ScrapedAssignment::from_work("Physics", &record);
        assert!(item.is_submitted);
        assert_eq!(item.score, "0");
    }
}
