use crate::sources::{Result, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use reqwest::{header::USER_AGENT, Client, Url};
use serde::{Deserialize, Deserializer};
use serde_with::{serde_as, DeserializeAs};
use tokio::time::Duration;

const CLIST_CONTEST_API: &str = "https://clist.by/api/v4/contest/";
const CLIENT_USER_AGENT: &str = "ContestTracker/1.0 (Rust)";

/// Query for the contests of one resource whose start falls within a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestQuery {
    pub resource_id: u32,
    pub start_gte: DateTime<Utc>,
    pub start_lte: DateTime<Utc>,
}

impl ContestQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            (
                String::from("start__gte"),
                self.start_gte.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (
                String::from("start__lte"),
                self.start_lte.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            (String::from("resource_id"), self.resource_id.to_string()),
            (String::from("format"), String::from("json")),
        ]
    }
}

#[async_trait]
pub trait ContestSource: Send + Sync {
    /// Fetch one page of contests. A single attempt; retrying is up to the caller.
    async fn fetch_contests(&self, query: &ContestQuery) -> Result<Vec<ClistContest>>;
}

#[derive(Debug, Deserialize)]
pub struct ClistContestList {
    pub objects: Option<Vec<ClistContest>>,
}

/// Either `"codeforces.com"` or `{"name": "codeforces.com", ...}` depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ClistResource {
    Domain(String),
    Detail { name: Option<String> },
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClistContest {
    pub id: i64,
    pub event: Option<String>,
    pub resource: Option<ClistResource>,
    pub href: Option<String>,
    #[serde_as(as = "ClistDateTime")]
    pub start: DateTime<Utc>,
    #[serde_as(as = "ClistDateTime")]
    pub end: DateTime<Utc>,
}

impl ClistContest {
    pub fn resource_name(&self) -> Option<&str> {
        match &self.resource {
            Some(ClistResource::Domain(name)) => Some(name.as_str()),
            Some(ClistResource::Detail { name }) => name.as_deref(),
            None => None,
        }
    }

    /// Lowercased resource name up to the first `.`, e.g. `codeforces.com` => `codeforces`.
    pub fn platform(&self) -> String {
        self.resource_name()
            .and_then(|name| name.split('.').next())
            .filter(|platform| !platform.is_empty())
            .map(|platform| platform.to_lowercase())
            .unwrap_or(String::from("unknown"))
    }
}

/// CLIST emits UTC timestamps without an offset (`2024-06-03T14:35:00`).
pub struct ClistDateTime;

impl<'de> DeserializeAs<'de, DateTime<Utc>> for ClistDateTime {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse_clist_datetime(&value).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

fn parse_clist_datetime(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(timestamp) => Ok(timestamp.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive)),
    }
}

pub struct ClistClient {
    url: Url,
    username: String,
    api_key: String,
    client: Client,
}

impl ClistClient {
    pub fn new(username: &str, api_key: &str) -> Result<Self> {
        Self::with_base_url(CLIST_CONTEST_API, username, api_key)
    }

    pub fn with_base_url(url: &str, username: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            url: Url::parse(url)?,
            username: String::from(username),
            api_key: String::from(api_key),
            client,
        })
    }
}

#[async_trait]
impl ContestSource for ClistClient {
    async fn fetch_contests(&self, query: &ContestQuery) -> Result<Vec<ClistContest>> {
        let mut params = query.to_query();
        params.push((String::from("username"), self.username.clone()));
        params.push((String::from("api_key"), self.api_key.clone()));

        let res = self
            .client
            .get(self.url.clone())
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .query(&params)
            .send()
            .await?;

        match res.error_for_status_ref() {
            Ok(_) => {
                let body: ClistContestList = res.json().await?;
                tracing::debug!(
                    "CLIST returned {:?} contests for resource_id {}",
                    body.objects.as_ref().map(|objects| objects.len()),
                    query.resource_id
                );
                match body.objects {
                    Some(objects) => Ok(objects),
                    None => {
                        tracing::warn!("No contests found for resource_id {}", query.resource_id);
                        Ok(Vec::new())
                    }
                }
            }
            Err(e) => {
                let body = res.text().await.unwrap_or_default();
                Err(SourceError::UnexpectedError(format!(
                    "unexpected error [{}] cause [{}]",
                    e, body
                )))
            }
        }
    }
}
