#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use educloud::error::ScrapeError;
use educloud::ucloud::{CasCredentials, SchoolPortal, UcloudApi, dto};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub const CAS_USERNAME: &str = "2023211001";
pub const CAS_PASSWORD: &str = "correct-horse";

/// Canned remote state. Tests mutate it between syncs to simulate changes
/// on the portal.
#[derive(Default)]
pub struct FakeData {
    pub courses: Value,
    pub details: HashMap<String, Value>,
    pub resource_trees: HashMap<String, Value>,
    pub undone: Value,
    pub works: HashMap<String, Value>,
    pub topics: HashMap<String, Value>,
    pub posts: HashMap<String, Value>,
    pub notification_pages: Vec<Value>,
    pub notification_total: u64,
    pub notification_requests: u32,
    pub logins: u32,
}

#[derive(Clone)]
pub struct FakePortal {
    pub data: Arc<Mutex<FakeData>>,
}

impl FakePortal {
    pub fn new(data: FakeData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub fn with_sample_data() -> Self {
        Self::new(sample_data())
    }

    pub fn update(&self, f: impl FnOnce(&mut FakeData)) {
        let mut data = self.data.lock().expect("fake data lock poisoned");
        f(&mut data);
    }

    pub fn notification_requests(&self) -> u32 {
        self.data.lock().expect("fake data lock poisoned").notification_requests
    }
}

#[async_trait]
impl SchoolPortal for FakePortal {
    async fn login(&self, credentials: &CasCredentials) -> Result<Box<dyn UcloudApi>, ScrapeError> {
        self.data.lock().expect("fake data lock poisoned").logins += 1;
        if credentials.username != CAS_USERNAME || credentials.password != CAS_PASSWORD {
            return Err(ScrapeError::LoginFailed);
        }
        Ok(Box::new(FakeApi {
            data: self.data.clone(),
        }))
    }
}

pub struct FakeApi {
    data: Arc<Mutex<FakeData>>,
}

fn from_value<T: DeserializeOwned + Default>(value: Option<&Value>) -> Result<T, ScrapeError> {
    match value {
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| ScrapeError::Parse(e.to_string()))
        }
        None => Ok(T::default()),
    }
}

#[async_trait]
impl UcloudApi for FakeApi {
    fn user_id(&self) -> &str {
        "remote-user-1"
    }

    async fn current_courses(&self) -> Result<Vec<dto::SiteRecord>, ScrapeError> {
        let data = self.data.lock().expect("fake data lock poisoned");
        from_value(Some(&data.courses))
    }

    async fn course_detail(&self, site_id: &str) -> Result<Option<dto::SiteDetail>, ScrapeError> {
        let data = self.data.lock().expect("fake data lock poisoned");
        match data.details.get(site_id) {
            Some(value) => from_value(Some(value)).map(Some),
            None => Ok(None),
        }
    }

    async fn course_resource_tree(
        &self,
        site_id: &str,
    ) -> Result<Vec<dto::ResourceNode>, ScrapeError> {
        let data = self.data.lock().expect("fake data lock poisoned");
        from_value(data.resource_trees.get(site_id))
    }

    async fn undone_assignments(&self) -> Result<Vec<dto::UndoneItem>, ScrapeError> {
        let data = self.data.lock().expect("fake data lock poisoned");
        if data.undone.is_null() {
            return Ok(Vec::new());
        }
        from_value(Some(&data.undone))
    }

    async fn course_assignments(&self, site_id: &str) -> Result<Vec<dto::WorkRecord>, ScrapeError> {
        let data = self.data.lock().expect("fake data lock poisoned");
        if site_id == "broken-site" {
            return Err(ScrapeError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        from_value(data.works.get(site_id))
    }

    async fn forum_topics(&self, site_id: &str) -> Result<Vec<dto::ForumTopic>, ScrapeError> {
        let data = self.data.lock().expect("fake data lock poisoned");
        from_value(data.topics.get(site_id))
    }

    async fn topic_posts(&self, topic_id: &str) -> Result<Vec<dto::ForumPost>, ScrapeError> {
        let data = self.data.lock().expect("fake data lock poisoned");
        from_value(data.posts.get(topic_id))
    }

    async fn notification_page(
        &self,
        current: u32,
        _size: u32,
    ) -> Result<dto::Paged<dto::NewsRecord>, ScrapeError> {
        let mut data = self.data.lock().expect("fake data lock poisoned");
        data.notification_requests += 1;

        let records = match data.notification_pages.get(current as usize - 1) {
            Some(page) => serde_json::from_value(page.clone())
                .map_err(|e| ScrapeError::Parse(e.to_string()))?,
            None => Vec::new(),
        };
        Ok(dto::Paged {
            records,
            total: data.notification_total,
        })
    }
}

pub fn credentials() -> CasCredentials {
    CasCredentials {
        username: CAS_USERNAME.to_string(),
        password: CAS_PASSWORD.to_string(),
    }
}

pub fn notification_page(range: std::ops::Range<u32>) -> Value {
    Value::Array(
        range
            .map(|i| {
                json!({
                    "id": format!("news-{}", i),
                    "newsTitle": format!("Notice {}", i),
                    "newsInfo": "<p>body</p>",
                    "type": "notice",
                    "isRead": 0,
                    "createTime": "2025-12-01 08:30"
                })
            })
            .collect(),
    )
}

/// Two courses, one with a resource tree and forum, plus to-do items,
/// per-course assignments and three pages of notifications.
pub fn sample_data() -> FakeData {
    let mut data = FakeData {
        courses: json!([
            {
                "id": "site-py",
                "siteName": "Python Programming",
                "courseCode": "CS101",
                "termName": "2025-2026-1",
                "teachers": [{"name": "Dr. Li"}],
                "departmentName": "Computer Science",
                "picUrl": "https://cdn/py.png",
                "briefIntroduction": "Intro to Python"
            },
            {
                "siteId": 10042,
                "name": "Linear Algebra",
                "teacherName": "Prof. Wang"
            }
        ]),
        undone: json!([
            {"siteName": "Python Programming", "activityName": "Lab 1",
             "endTime": "2026-01-09 23:59"},
            {"activityName": "Reading report", "endTime": 1767974340000_i64}
        ]),
        notification_pages: vec![
            notification_page(0..10),
            notification_page(10..20),
            notification_page(20..23),
        ],
        notification_total: 0,
        ..Default::default()
    };

    data.details.insert("10042".to_string(), json!({"introduction": "Vectors and matrices"}));

    data.resource_trees.insert(
        "site-py".to_string(),
        json!([
            {
                "resourceName": "Chapter 1",
                "attachmentVOs": [
                    {"resource": {"id": "res-1", "name": "ch1.pptx", "ext": "pptx",
                                  "fileSizeUnit": "1.2MB", "url": "https://cdn/res-1?v=1"}},
                    {"resource": {"id": "res-2", "name": "ch1.pdf", "ext": "pdf"}}
                ]
            }
        ]),
    );

    data.works.insert(
        "site-py".to_string(),
        json!([
            {"assignmentTitle": "Lab 1", "assignmentEndTime": "2026-01-09 23:59",
             "submitTime": null, "score": null},
            {"assignmentTitle": "Lab 2", "description": "Loops",
             "assignmentEndTime": "2026-01-16 23:59", "submitTime": "2026-01-10 12:00", "score": 95}
        ]),
    );
    data.works.insert(
        "10042".to_string(),
        json!([
            {"title": "Reading report", "description": "Chapter 2 summary",
             "submitTime": "", "score": null}
        ]),
    );

    data.topics.insert(
        "site-py".to_string(),
        json!([
            {"id": "topic-1", "title": "Lab 1 questions", "userName": "alice", "body": "<p>?</p>",
             "viewNum": 10, "replyNum": 2, "likeNum": 1, "createTime": "2025-10-20 09:30:00"}
        ]),
    );
    data.posts.insert(
        "topic-1".to_string(),
        json!([
            {"id": "post-1", "userName": "bob", "body": "Check slide 3", "floor": 1,
             "createTime": "2025-10-20 10:00:00"},
            {"id": "post-2", "userName": "carol", "body": "Thanks", "floor": 2}
        ]),
    );

    data
}
