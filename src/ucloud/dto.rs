use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The portal sends `null` where it means "none" for lists and totals.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Every Ucloud endpoint wraps its payload as `{"code", "success", "msg", "data"}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paged<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub records: Vec<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

/// The course list answers with either a bare array or a paged object
/// depending on the endpoint revision.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SiteList {
    List(Vec<SiteRecord>),
    Paged(Paged<SiteRecord>),
}

impl SiteList {
    pub fn into_records(self) -> Vec<SiteRecord> {
        match self {
            SiteList::List(records) => records,
            SiteList::Paged(page) => page.records,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Teacher {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteRecord {
    pub id: Option<Value>,
    pub site_id: Option<Value>,
    pub name: Option<String>,
    pub site_name: Option<String>,
    pub course_code: Option<String>,
    pub term_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub teachers: Vec<Teacher>,
    pub teacher_name: Option<String>,
    pub department_name: Option<String>,
    pub pic_url: Option<String>,
    pub brief_introduction: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteDetail {
    pub brief_introduction: Option<String>,
    pub introduction: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceNode {
    pub resource_name: Option<String>,
    #[serde(rename = "attachmentVOs", deserialize_with = "null_as_default")]
    pub attachment_vos: Vec<Attachment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub resource: Option<ResourceFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceFile {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub ext: Option<String>,
    pub file_size_unit: Option<String>,
    pub url: Option<String>,
    pub create_time: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UndoneList {
    #[serde(deserialize_with = "null_as_default")]
    pub undone_list: Vec<UndoneItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UndoneItem {
    pub site_name: Option<String>,
    pub activity_name: Option<String>,
    pub end_time: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkRecord {
    pub assignment_title: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignment_end_time: Option<Value>,
    pub submit_time: Option<String>,
    pub score: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForumTopic {
    pub id: Option<Value>,
    pub title: Option<String>,
    pub user_name: Option<String>,
    pub body: Option<String>,
    pub view_num: Option<Value>,
    pub reply_num: Option<Value>,
    pub like_num: Option<Value>,
    pub create_time: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForumPost {
    pub id: Option<Value>,
    pub user_name: Option<String>,
    pub body: Option<String>,
    pub floor: Option<Value>,
    pub create_time: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsRecord {
    pub id: Option<Value>,
    pub news_title: Option<String>,
    pub news_info: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub is_read: Option<Value>,
    pub create_time: Option<Value>,
    pub news_copy_time: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub user_id: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkListRequest<'a> {
    pub site_id: &'a str,
    pub user_id: &'a str,
    pub current: u32,
    pub size: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsListRequest<'a> {
    pub news_copy_person_id: &'a str,
    pub current: u32,
    pub size: u32,
}
