//! Jira Cloud REST client
//!
//! Talks to `https://{host}.atlassian.net/rest/api/2/` using basic auth with
//! a username and API token. Searches always expand the changelog, since the
//! workflow history is the whole point of the extraction.

use std::fmt;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::jql::{self, DateWindow};
use crate::model::WorkItem;
use crate::parser;
use crate::workflow::{SelectionType, Workflow};

/// Largest page Jira Cloud will return from a search
pub const MAX_PAGE_SIZE: u32 = 100;

/// Time allowed for a whole request, response body included
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Username and API token for basic auth
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// One page of `/search` results
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<Value>,
}

/// Anything that can answer a paged JQL search
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    async fn search_page(&self, jql: &str, start_at: u32, max_results: u32) -> Result<SearchPage>;
}

/// Accesses a Jira instance via the REST API
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl Client {
    /// Client for a Jira Cloud host, given without the `.atlassian.net` part
    pub fn new(host: &str, credentials: Option<Credentials>) -> Result<Self> {
        Self::with_base_url(format!("https://{}.atlassian.net/rest/api/2/", host), credentials)
    }

    /// Client for an arbitrary REST API root (self-hosted Jira)
    pub fn with_base_url(
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http: http_client(DEFAULT_TIMEOUT)?,
            base_url,
            credentials,
        })
    }

    /// Replace the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = http_client(timeout)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, path: &str) -> RequestBuilder {
        let req = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(ACCEPT, "application/json");
        match &self.credentials {
            Some(c) => req.basic_auth(&c.username, Some(&c.token)),
            None => req,
        }
    }

    async fn send_json(req: RequestBuilder) -> Result<Value> {
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Fetch the raw JSON of an issue, changelog included
    pub async fn get_raw(&self, key: &str) -> Result<Value> {
        debug!(key, "fetching issue");
        let req = self
            .request(&format!("issue/{}", key))
            .query(&[("expand", "changelog")]);
        Self::send_json(req).await
    }

    /// Fetch an issue by key (e.g. `XYZZY-1`) and enrich it
    pub async fn get_by_key(&self, key: &str, workflow: &Workflow) -> Result<WorkItem> {
        let raw = self.get_raw(key).await?;
        parser::parse_issue(raw, workflow)
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("chiketto/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()?)
}

impl IssueSource for Client {
    async fn search_page(&self, jql: &str, start_at: u32, max_results: u32) -> Result<SearchPage> {
        let req = self.request("search").query(&[
            ("jql", jql.to_string()),
            ("startAt", start_at.to_string()),
            ("maxResults", max_results.to_string()),
            ("expand", "changelog".to_string()),
        ]);
        let value = Self::send_json(req).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Find every work item of a project inside the window
///
/// Pages until Jira reports no more results. The page size is only a hint;
/// Jira may return fewer issues per page than asked for.
pub async fn find_work_items<S: IssueSource>(
    source: &S,
    project: &str,
    window: &DateWindow,
    selection: SelectionType,
    workflow: &Workflow,
    page_size: u32,
) -> Result<Vec<WorkItem>> {
    let query = jql::project_query(project, window, selection);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    debug!(project, jql = %query, "searching");

    let mut items = Vec::new();
    let mut start_at = 0;
    loop {
        let page = source.search_page(&query, start_at, page_size).await?;
        let fetched = page.issues.len() as u32;
        for issue in page.issues {
            items.push(parser::parse_issue(issue, workflow)?);
        }
        start_at += fetched;
        debug!(project, fetched, total = page.total, "page received");

        if fetched == 0 || start_at >= page.total {
            break;
        }
    }

    Ok(items)
}
