use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use sentrag_core::config::StoreSettings;
use sentrag_core::traits::VectorStore;
use sentrag_core::types::{SearchHit, SearchMode, SearchQuery, VectorRow};

use crate::error::StoreError;
use crate::request::{MetricType, SearchRequest};
use crate::response::{SearchResponse, StatusResponse};

/// Blocking client for one table of the document store.
///
/// Inserts go out as `POST .../docs`, searches as `GET .../docs` with a JSON
/// body. Neither is retried.
#[derive(Clone)]
pub struct InfinityStore {
    client: Client,
    docs_url: String,
    mode: SearchMode,
    metric: MetricType,
    filter: Option<String>,
}

impl InfinityStore {
    pub fn new(base_url: &str, database: &str, table: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            "store endpoint must be an http(s) URL"
        );
        anyhow::ensure!(!database.trim().is_empty(), "database name is required");
        anyhow::ensure!(!table.trim().is_empty(), "table name is required");
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build store HTTP client")?;
        let docs_url = format!(
            "{}/databases/{}/tables/{}/docs",
            base_url.trim_end_matches('/'),
            database,
            table
        );
        Ok(Self { client, docs_url, mode: SearchMode::Text, metric: MetricType::Cosine, filter: None })
    }

    pub fn from_settings(settings: &StoreSettings) -> anyhow::Result<Self> {
        let metric: MetricType = settings.metric.parse()?;
        Ok(Self::new(&settings.base_url, &settings.database, &settings.table, settings.timeout())?
            .with_mode(settings.mode)
            .with_metric(metric))
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_metric(mut self, metric: MetricType) -> Self {
        self.metric = metric;
        self
    }

    /// Restrict every search to rows matching a store-side filter expression.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn docs_url(&self) -> &str {
        &self.docs_url
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Insert all rows as one payload. An empty slice sends nothing.
    pub fn insert(&self, rows: &[VectorRow]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let payload: Vec<InsertRow<'_>> = rows.iter().map(InsertRow::from).collect();
        let resp = self
            .client
            .post(&self.docs_url)
            .json(&payload)
            .send()
            .map_err(StoreError::Transport)?;
        let status: StatusResponse = read_json(resp, "insert")?;
        status.into_result("insert")
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, StoreError> {
        let request = SearchRequest::for_query(self.mode, self.metric, query)?.with_filter(self.filter.clone());
        let resp = self
            .client
            .get(&self.docs_url)
            .json(&request)
            .send()
            .map_err(StoreError::Transport)?;
        let parsed: SearchResponse = read_json(resp, "search")?;
        parsed.into_hits()
    }
}

impl VectorStore for InfinityStore {
    fn insert(&self, rows: &[VectorRow]) -> anyhow::Result<()> {
        Ok(InfinityStore::insert(self, rows)?)
    }

    fn search(&self, query: &SearchQuery) -> anyhow::Result<Vec<SearchHit>> {
        Ok(InfinityStore::search(self, query)?)
    }
}

/// Decode a JSON body. Non-2xx responses that still carry a non-zero store
/// error code are reported as rejections so the store's message is kept.
fn read_json<T: DeserializeOwned>(resp: Response, operation: &'static str) -> Result<T, StoreError> {
    let status = resp.status();
    let body = resp.text().map_err(StoreError::Transport)?;
    if !status.is_success() {
        if let Ok(reported) = serde_json::from_str::<StatusResponse>(&body) {
            if reported.error_code != 0 {
                return Err(StoreError::Rejected {
                    operation,
                    code: reported.error_code,
                    message: reported.error_msg.unwrap_or_default(),
                });
            }
        }
        return Err(StoreError::Status { status, body });
    }
    serde_json::from_str(&body).map_err(StoreError::Malformed)
}

#[derive(Serialize)]
struct InsertRow<'a> {
    name: &'a str,
    fulltext_column: &'a str,
    index: usize,
    dense_column: &'a [f32],
}

impl<'a> From<&'a VectorRow> for InsertRow<'a> {
    fn from(row: &'a VectorRow) -> Self {
        Self { name: &row.name, fulltext_column: &row.text, index: row.index, dense_column: &row.vector }
    }
}
