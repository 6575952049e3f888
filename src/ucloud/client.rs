use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, header};
use serde::de::DeserializeOwned;

use super::auth::UcloudSession;
use super::{UcloudApi, dto};
use crate::error::ScrapeError;

const COURSE_PAGE_SIZE: u32 = 50;
const WORK_PAGE_SIZE: u32 = 50;
const TOPIC_PAGE_SIZE: u32 = 5;
const POST_PAGE_SIZE: u32 = 10;
// Site role 2 is "student".
const STUDENT_SITE_ROLE: &str = "2";

pub struct UcloudHttpClient {
    session: UcloudSession,
    api_base: String,
}

impl UcloudHttpClient {
    pub fn new(session: UcloudSession, api_base: &str) -> Self {
        Self {
            session,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(header::CONTENT_TYPE, "application/json;charset=UTF-8")
            .header("Blade-Auth", format!("bearer {}", self.session.access_token))
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, ScrapeError> {
        let response = self
            .authorized(self.session.client.get(self.url(path)))
            .query(query)
            .send()
            .await
            .map_err(|e| ScrapeError::Http(e.to_string()))?;

        read_envelope(response).await
    }

    async fn post_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<Option<T>, ScrapeError> {
        let mut request = self
            .authorized(self.session.client.post(self.url(path)))
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScrapeError::Http(e.to_string()))?;

        read_envelope(response).await
    }
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ScrapeError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ScrapeError::Status { status: status.as_u16(), body });
    }

    let envelope: dto::Envelope<T> = response
        .json()
        .await
        .map_err(|e| ScrapeError::Parse(e.to_string()))?;

    Ok(envelope.data)
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ScrapeError> {
    serde_json::to_value(value).map_err(|e| ScrapeError::Parse(e.to_string()))
}

#[async_trait]
impl UcloudApi for UcloudHttpClient {
    fn user_id(&self) -> &str {
        &self.session.user_id
    }

    async fn current_courses(&self) -> Result<Vec<dto::SiteRecord>, ScrapeError> {
        let size = COURSE_PAGE_SIZE.to_string();
        let list: Option<dto::SiteList> = self
            .get_data(
                "/ykt-site/site/list/student/current",
                &[
                    ("userId", self.user_id()),
                    ("current", "1"),
                    ("size", size.as_str()),
                    ("siteRoleCode", STUDENT_SITE_ROLE),
                ],
            )
            .await?;

        Ok(list.map(dto::SiteList::into_records).unwrap_or_default())
    }

    async fn course_detail(&self, site_id: &str) -> Result<Option<dto::SiteDetail>, ScrapeError> {
        self.get_data("/ykt-site/site/detail", &[("id", site_id)]).await
    }

    async fn course_resource_tree(
        &self,
        site_id: &str,
    ) -> Result<Vec<dto::ResourceNode>, ScrapeError> {
        let nodes: Option<Vec<dto::ResourceNode>> = self
            .post_data(
                "/ykt-site/site-resource/tree/student",
                &[("siteId", site_id), ("userId", self.user_id())],
                None,
            )
            .await?;

        Ok(nodes.unwrap_or_default())
    }

    async fn undone_assignments(&self) -> Result<Vec<dto::UndoneItem>, ScrapeError> {
        let list: Option<dto::UndoneList> = self
            .get_data("/ykt-site/site/student/undone", &[("userId", self.user_id())])
            .await?;

        Ok(list.map(|l| l.undone_list).unwrap_or_default())
    }

    async fn course_assignments(&self, site_id: &str) -> Result<Vec<dto::WorkRecord>, ScrapeError> {
        let body = to_body(&dto::WorkListRequest {
            site_id,
            user_id: self.user_id(),
            current: 1,
            size: WORK_PAGE_SIZE,
        })?;

        let page: Option<dto::Paged<dto::WorkRecord>> = self
            .post_data("/ykt-site/work/student/list", &[], Some(&body))
            .await?;

        Ok(page.map(|p| p.records).unwrap_or_default())
    }

    async fn forum_topics(&self, site_id: &str) -> Result<Vec<dto::ForumTopic>, ScrapeError> {
        let size = TOPIC_PAGE_SIZE.to_string();
        let page: Option<dto::Paged<dto::ForumTopic>> = self
            .get_data(
                "/ykt-activity/forum/page",
                &[
                    ("siteId", site_id),
                    ("userId", self.user_id()),
                    ("current", "1"),
                    ("size", size.as_str()),
                    ("roleType", "1"),
                ],
            )
            .await?;

        Ok(page.map(|p| p.records).unwrap_or_default())
    }

    async fn topic_posts(&self, topic_id: &str) -> Result<Vec<dto::ForumPost>, ScrapeError> {
        let size = POST_PAGE_SIZE.to_string();
        let page: Option<dto::Paged<dto::ForumPost>> = self
            .get_data(
                "/ykt-activity/forum/list/topic-post",
                &[
                    ("tid", topic_id),
                    ("userId", self.user_id()),
                    ("current", "1"),
                    ("size", size.as_str()),
                ],
            )
            .await?;

        Ok(page.map(|p| p.records).unwrap_or_default())
    }

    async fn notification_page(
        &self,
        current: u32,
        size: u32,
    ) -> Result<dto::Paged<dto::NewsRecord>, ScrapeError> {
        // The server reads paging from either the query string or the body
        // depending on deployment, so both carry it.
        let current_str = current.to_string();
        let size_str = size.to_string();
        let body = to_body(&dto::NewsListRequest {
            news_copy_person_id: self.user_id(),
            current,
            size,
        })?;

        let page: Option<dto::Paged<dto::NewsRecord>> = self
            .post_data(
                "/ykt-basics/api/inform/news/list",
                &[
                    ("newsCopyPersonId", self.user_id()),
                    ("current", current_str.as_str()),
                    ("size", size_str.as_str()),
                ],
                Some(&body),
            )
            .await?;

        Ok(page.unwrap_or(dto::Paged {
            records: Vec::new(),
            total: 0,
        }))
    }
}
