pub mod auth;
pub mod client;
pub mod dto;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{ConfigError, env_or, env_parse};
use crate::error::ScrapeError;

pub use client::UcloudHttpClient;

#[derive(Clone, Debug)]
pub struct UcloudConfig {
    pub api_base: String,
    pub cas_login_url: String,
    pub service_url: String,
    pub notification_page_delay: Duration,
}

impl UcloudConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let api_base = env_or("UCLOUD_API_BASE", "https://apiucloud.bupt.edu.cn");
        let cas_login_url = env_or("CAS_LOGIN_URL", "https://auth.bupt.edu.cn/authserver/login");
        let service_url = env_or("UCLOUD_SERVICE_URL", "https://ucloud.bupt.edu.cn");
        let delay_ms: u64 = env_parse("NOTIFICATION_PAGE_DELAY_MS", 200)?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            cas_login_url,
            service_url,
            notification_page_delay: Duration::from_millis(delay_ms),
        })
    }
}

/// School account used to log into CAS.
#[derive(Clone, PartialEq, Eq)]
pub struct CasCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CasCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Entry point to the school portal: turns CAS credentials into an
/// authenticated API handle.
#[async_trait]
pub trait SchoolPortal: Send + Sync {
    async fn login(&self, credentials: &CasCredentials) -> Result<Box<dyn UcloudApi>, ScrapeError>;

    /// Pause between consecutive page requests of paginated endpoints.
    fn page_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// The remote endpoints the scrapers read from, one method per endpoint.
#[async_trait]
pub trait UcloudApi: Send + Sync {
    fn user_id(&self) -> &str;

    async fn current_courses(&self) -> Result<Vec<dto::SiteRecord>, ScrapeError>;

    async fn course_detail(&self, site_id: &str) -> Result<Option<dto::SiteDetail>, ScrapeError>;

    async fn course_resource_tree(
        &self,
        site_id: &str,
    ) -> Result<Vec<dto::ResourceNode>, ScrapeError>;

    async fn undone_assignments(&self) -> Result<Vec<dto::UndoneItem>, ScrapeError>;

    async fn course_assignments(&self, site_id: &str) -> Result<Vec<dto::WorkRecord>, ScrapeError>;

    async fn forum_topics(&self, site_id: &str) -> Result<Vec<dto::ForumTopic>, ScrapeError>;

    async fn topic_posts(&self, topic_id: &str) -> Result<Vec<dto::ForumPost>, ScrapeError>;

    async fn notification_page(
        &self,
        current: u32,
        size: u32,
    ) -> Result<dto::Paged<dto::NewsRecord>, ScrapeError>;
}

pub struct UcloudPortal {
    config: UcloudConfig,
}

impl UcloudPortal {
    pub fn new(config: UcloudConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SchoolPortal for UcloudPortal {
    async fn login(&self, credentials: &CasCredentials) -> Result<Box<dyn UcloudApi>, ScrapeError> {
        let session = auth::login(&self.config, credentials).await?;
        Ok(Box::new(UcloudHttpClient::new(session, &self.config.api_base)))
    }

    fn page_delay(&self) -> Duration {
        self.config.notification_page_delay
    }
}
