//! CAS single sign-on for the Ucloud portal.
//!
//! The flow is: fetch the CAS login form, post the credentials together with
//! the form's `execution` token, catch the service ticket on the redirect back
//! to Ucloud, and trade that ticket for a Ucloud bearer token.

use reqwest::{Client, Response, Url, header, redirect::Policy};
use scraper::{Html, Selector};
use tracing::{debug, info};

use super::{CasCredentials, UcloudConfig, dto};
use crate::error::ScrapeError;
use crate::scrape::value_to_string;

pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
);

// Public client id of the Ucloud web front-end ("portal:portal_secret").
const UCLOUD_BASIC_AUTH: &str = "Basic cG9ydGFsOnBvcnRhbF9zZWNyZXQ=";
const TENANT_ID: &str = "000000";

/// An authenticated Ucloud session.
pub struct UcloudSession {
    pub client: Client,
    pub access_token: String,
    pub user_id: String,
}

pub async fn login(
    config: &UcloudConfig,
    credentials: &CasCredentials,
) -> Result<UcloudSession, ScrapeError> {
    info!("Logging into CAS as {}", credentials.username);

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .redirect(Policy::custom(|attempt| {
            if ticket_from_url(attempt.url()).is_some() {
                attempt.stop()
            } else {
                attempt.follow()
            }
        }))
        .build()
        .map_err(|e| ScrapeError::Http(format!("Failed to build http client: {}", e)))?;

    let service = [("service", config.service_url.as_str())];

    let login_page = client
        .get(&config.cas_login_url)
        .query(&service)
        .send()
        .await
        .map_err(|e| ScrapeError::Http(e.to_string()))?;

    if !login_page.status().is_success() {
        let status = login_page.status();
        let body = login_page.text().await.unwrap_or_default();
        return Err(ScrapeError::Status { status: status.as_u16(), body });
    }

    let html = login_page
        .text()
        .await
        .map_err(|e| ScrapeError::Http(e.to_string()))?;
    let execution = extract_execution(&html)?;

    let form = [
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
        ("submit", "LOGIN"),
        ("type", "username_password"),
        ("execution", execution.as_str()),
        ("_eventId", "submit"),
    ];

    let response = client
        .post(&config.cas_login_url)
        .query(&service)
        .form(&form)
        .send()
        .await
        .map_err(|e| ScrapeError::Http(e.to_string()))?;

    let ticket = ticket_from_response(&response).ok_or(ScrapeError::LoginFailed)?;
    debug!("CAS issued a service ticket");

    let token_url = format!("{}/ykt-basics/oauth/token", config.api_base);
    let response = client
        .post(&token_url)
        .header(header::AUTHORIZATION, UCLOUD_BASIC_AUTH)
        .header("Tenant-Id", TENANT_ID)
        .form(&[("ticket", ticket.as_str()), ("grant_type", "third")])
        .send()
        .await
        .map_err(|e| ScrapeError::Http(e.to_string()))?;

    let status = response.status();
    if status.as_u16() == 401 {
        return Err(ScrapeError::LoginFailed);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ScrapeError::Status { status: status.as_u16(), body });
    }

    let token: dto::TokenResponse = response
        .json()
        .await
        .map_err(|e| ScrapeError::Parse(e.to_string()))?;

    let user_id = token
        .user_id
        .as_ref()
        .and_then(value_to_string)
        .ok_or(ScrapeError::MissingUserId)?;

    info!("CAS login succeeded, remote user id {}", user_id);

    Ok(UcloudSession {
        client,
        access_token: token.access_token,
        user_id,
    })
}

/// Pulls the one-time `execution` token out of the CAS login form.
pub fn extract_execution(html: &str) -> Result<String, ScrapeError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"input[name="execution"]"#)
        .map_err(|e| ScrapeError::Parse(e.to_string()))?;

    document
        .select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::Parse("CAS login form has no execution field".to_string()))
}

fn ticket_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "ticket")
        .map(|(_, value)| value.into_owned())
        .filter(|ticket| !ticket.is_empty())
}

fn ticket_from_response(response: &Response) -> Option<String> {
    if let Some(ticket) = ticket_from_url(response.url()) {
        return Some(ticket);
    }
    let location = response.headers().get(header::LOCATION)?.to_str().ok()?;
    let target = response.url().join(location).ok()?;
    ticket_from_url(&target)
}
