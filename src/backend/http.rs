use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::schema::BackendConfig;

use super::error::BackendError;
use super::types::{
    FilingConfirmation, FilingList, FilingRecord, FilingRequest, SearchList, SearchRecord,
    SearchRequest, SearchSubmission,
};
use super::Backend;

/// Longest response body echoed back inside a [`BackendError::Status`].
const MAX_ERROR_BODY: usize = 300;

/// [`Backend`] over the trademark service's REST API.
pub struct HttpBackend {
    base_url: String,
    api_key: Option<String>,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        if config.base_url.trim().is_empty() {
            return Err(BackendError::Config(
                "backend base_url cannot be empty".to_string(),
            ));
        }
        if config.timeout_ms == 0 {
            return Err(BackendError::Config(
                "backend timeout must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            timeout_ms: config.timeout_ms,
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .map_err(|error| BackendError::Config(error.to_string()))?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        label: &str,
    ) -> Result<T, BackendError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|error| self.map_connectivity_error(error, label))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                endpoint = label,
                status = status.as_u16(),
                "backend request rejected"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY),
            });
        }

        response.json::<T>().await.map_err(|error| {
            BackendError::InvalidResponse(format!("failed to parse {label} response: {error}"))
        })
    }

    fn map_connectivity_error(&self, error: reqwest::Error, label: &str) -> BackendError {
        if error.is_timeout() {
            return BackendError::Timeout(format!(
                "{label} timed out after {} ms",
                self.timeout_ms
            ));
        }
        if error.is_connect() {
            return BackendError::Request(format!(
                "could not reach trademark API at {}: {error}",
                self.base_url
            ));
        }
        BackendError::from(error)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}

fn lookup_query<'a>(email: &'a str, id: Option<&'a str>) -> Vec<(&'static str, &'a str)> {
    let mut query = vec![("email", email)];
    if let Some(id) = id {
        query.push(("id", id));
    }
    query
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    fn id(&self) -> &str {
        "http"
    }

    async fn submit_search(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchSubmission, BackendError> {
        let builder = self
            .client
            .post(self.endpoint("/api/trademark-search"))
            .json(request);
        self.send_json(builder, "POST /api/trademark-search").await
    }

    async fn list_searches(
        &self,
        email: &str,
        search_id: Option<&str>,
    ) -> Result<Vec<SearchRecord>, BackendError> {
        let builder = self
            .client
            .get(self.endpoint("/api/trademark-search"))
            .query(&lookup_query(email, search_id));
        let list: SearchList = self
            .send_json(builder, "GET /api/trademark-search")
            .await?;
        Ok(list.searches)
    }

    async fn create_filing(
        &self,
        request: &FilingRequest,
    ) -> Result<FilingConfirmation, BackendError> {
        let builder = self.client.post(self.endpoint("/api/filings")).json(request);
        self.send_json(builder, "POST /api/filings").await
    }

    async fn get_filings(
        &self,
        email: &str,
        filing_id: Option<&str>,
    ) -> Result<Vec<FilingRecord>, BackendError> {
        let builder = self
            .client
            .get(self.endpoint("/api/filings"))
            .query(&lookup_query(email, filing_id));
        let list: FilingList = self.send_json(builder, "GET /api/filings").await?;
        Ok(list.filings)
    }
}
