use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{first_non_blank, opt_value_to_string, parse_time_opt};
use crate::error::ScrapeError;
use crate::ucloud::{CasCredentials, SchoolPortal, UcloudApi, dto};

pub const PAGE_SIZE: u32 = 10;
pub const MAX_PAGES: u32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedNotification {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub msg_type: Option<String>,
    pub is_read: bool,
    pub publish_time: Option<NaiveDateTime>,
}

impl ScrapedNotification {
    fn from_remote(record: &dto::NewsRecord) -> Option<Self> {
        Some(Self {
            id: opt_value_to_string(record.id.as_ref())?,
            title: first_non_blank([record.news_title.as_deref()]),
            content: record.news_info.clone(),
            msg_type: first_non_blank([record.kind.as_deref()]),
            is_read: read_flag(record.is_read.as_ref()),
            publish_time: publish_time(record),
        })
    }
}

/// The read flag arrives as `0`/`1`, `"0"`/`"1"` or a boolean.
fn read_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}

fn publish_time(record: &dto::NewsRecord) -> Option<NaiveDateTime> {
    parse_time_opt(record.create_time.as_ref())
        .or_else(|| parse_time_opt(record.news_copy_time.as_ref()))
}

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStop {
    Empty,
    Repeated,
    ReachedTotal,
    ShortPage,
    PageCap,
}

/// Accumulates notification pages and decides when to stop asking for more.
#[derive(Debug, Default)]
pub struct NotificationPager {
    items: Vec<ScrapedNotification>,
    seen: HashSet<String>,
    last_id: Option<String>,
}

impl NotificationPager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one page; returns `Some` once no further page should be requested.
    pub fn push_page(
        &mut self,
        page_no: u32,
        page: &dto::Paged<dto::NewsRecord>,
    ) -> Option<PageStop> {
        if page.records.is_empty() {
            return Some(PageStop::Empty);
        }

        let first_id = opt_value_to_string(page.records[0].id.as_ref());
        if first_id.is_some() && first_id == self.last_id {
            return Some(PageStop::Repeated);
        }

        let before = self.items.len();
        for record in &page.records {
            let Some(item) = ScrapedNotification::from_remote(record) else {
                continue;
            };
            self.last_id = Some(item.id.clone());
            if self.seen.insert(item.id.clone()) {
                self.items.push(item);
            }
        }
        // A page with nothing new means the server ignores `current`.
        if page_no > 1 && self.items.len() == before {
            return Some(PageStop::Repeated);
        }

        if page.total > 0 && self.items.len() as u64 >= page.total {
            return Some(PageStop::ReachedTotal);
        }
        if (page.records.len() as u32) < PAGE_SIZE {
            return Some(PageStop::ShortPage);
        }
        if page_no >= MAX_PAGES {
            return Some(PageStop::PageCap);
        }
        None
    }

    pub fn into_items(self) -> Vec<ScrapedNotification> {
        self.items
    }
}

pub async fn run(
    portal: &dyn SchoolPortal,
    credentials: &CasCredentials,
) -> Result<Vec<ScrapedNotification>, ScrapeError> {
    let api = portal.login(credentials).await?;
    Ok(collect(api.as_ref(), portal.page_delay()).await)
}

pub async fn collect(
    api: &dyn UcloudApi,
    page_delay: std::time::Duration,
) -> Vec<ScrapedNotification> {
    let mut pager = NotificationPager::new();
    let mut page_no = 1;

    loop {
        let page = match api.notification_page(page_no, PAGE_SIZE).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch notification page {}: {}", page_no, e);
                break;
            }
        };

        if let Some(reason) = pager.push_page(page_no, &page) {
            debug!("Notification paging stopped at page {}: {:?}", page_no, reason);
            break;
        }

        page_no += 1;
        if !page_delay.is_zero() {
            tokio::time::sleep(page_delay).await;
        }
    }

    let items = pager.into_items();
    info!("Fetched {} notifications", items.len());
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(ids: std::ops::Range<u32>, total: u64) -> dto::Paged<dto::NewsRecord> {
        dto::Paged {
            records: ids
                .map(|i| dto::NewsRecord {
                    id: Some(json!(format!("n{}", i))),
                    news_title: Some(format!("Notice {}", i)),
                    ..Default::default()
                })
                .collect(),
            total,
        }
    }

    #[test]
    fn stops_on_short_page() {
        let mut pager = NotificationPager::new();
        assert_eq!(pager.push_page(1, &page(0..10, 0)), None);
        assert_eq!(pager.push_page(2, &page(10..13, 0)), Some(PageStop::ShortPage));
        assert_eq!(pager.into_items().len(), 13);
    }

    #[test]
    fn stops_when_total_reached() {
        let mut pager = NotificationPager::new();
        assert_eq!(pager.push_page(1, &page(0..10, 20)), None);
        assert_eq!(pager.push_page(2, &page(10..20, 20)), Some(PageStop::ReachedTotal));
    }

    #[test]
    fn stops_when_server_echoes_last_record() {
        let mut pager = NotificationPager::new();
        assert_eq!(pager.push_page(1, &page(0..10, 0)), None);
        assert_eq!(pager.push_page(2, &page(9..19, 0)), Some(PageStop::Repeated));
        assert_eq!(pager.into_items().len(), 10);
    }

    #[test]
    fn stops_when_page_brings_nothing_new() {
        let mut pager = NotificationPager::new();
        assert_eq!(pager.push_page(1, &page(0..10, 0)), None);
        assert_eq!(pager.push_page(2, &page(0..10, 0)), Some(PageStop::Repeated));
        assert_eq!(pager.into_items().len(), 10);
    }

    #[test]
    fn stops_on_empty_page_and_skips_duplicates() {
        let mut pager = NotificationPager::new();
        assert_eq!(pager.push_page(1, &page(0..10, 0)), None);
        assert_eq!(pager.push_page(2, &page(5..15, 0)), None);
        assert_eq!(pager.push_page(3, &page(0..0, 0)), Some(PageStop::Empty));
        assert_eq!(pager.into_items().len(), 15);
    }

    #[test]
    fn stops_at_page_cap() {
        let mut pager = NotificationPager::new();
        let mut stop = None;
        for n in 1..=MAX_PAGES {
            stop = pager.push_page(n, &page(n * 10..n * 10 + 10, 0));
            if stop.is_some() {
                assert_eq!(n, MAX_PAGES);
            }
        }
        assert_eq!(stop, Some(PageStop::PageCap));
    }

    #[test]
    fn maps_read_flag_and_publish_time() {
        let record: dto::NewsRecord = serde_json::from_value(json!({
            "id": 42,
            "newsTitle": "Exam room change",
            "type": "notice",
            "isRead": 1,
            "createTime": "2025-12-01 08:30"
        }))
        .unwrap();
        let n = ScrapedNotification::from_remote(&record).unwrap();
        assert_eq!(n.id, "42");
        assert!(n.is_read);
        assert_eq!(n.publish_time.unwrap().to_string(), "2025-12-01 08:30:00");

        let unread: dto::NewsRecord = serde_json::from_value(json!({
            "id": "43",
            "isRead": false,
            "newsCopyTime": "2025-12-02 10:00:00"
        }))
        .unwrap();
        let n = ScrapedNotification::from_remote(&unread).unwrap();
        assert!(!n.is_read);
        assert!(n.publish_time.is_some());
    }

    #[test]
    fn blank_create_time_falls_back_to_copy_time() {
        let record: dto::NewsRecord = serde_json::from_value(json!({
            "id": "n1",
            "createTime": "",
            "newsCopyTime": "2025-12-02 10:00:00"
        }))
        .unwrap();
        let mut pager = NotificationPager::new();
        let page = dto::Paged {
            records: vec![record],
            total: 1,
        };
        assert_eq!(pager.push_page(1, &page), Some(PageStop::ReachedTotal));

        let items = pager.into_items();
        assert_eq!(items[0].publish_time.unwrap().to_string(), "2025-12-02 10:00:00");
    }

    #[test]
    fn null_records_read_as_an_empty_page() {
        let page: dto::Paged<dto::NewsRecord> =
            serde_json::from_value(json!({"records": null, "total": null})).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(NotificationPager::new().push_page(1, &page), Some(PageStop::Empty));
    }
}
