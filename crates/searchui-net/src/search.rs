//! Search API and signals client.

use crate::http::{HttpClient, HttpError};
use searchui_core::backend::{SearchBackend, SignalSink};
use searchui_core::city::Signal;
use searchui_core::config::Config;
use searchui_core::error::SearchError;
use searchui_core::types::{SearchRequest, SearchResponse};
use std::time::Duration;

const JSON: &str = "application/json";

/// Talks to `/rest/searchApi/search` and `/rest/signals/add`.
#[derive(Clone)]
pub struct SearchClient {
    http: HttpClient,
    search_url: String,
    signals_url: String,
    timeout: Duration,
}

impl SearchClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: HttpClient::new(),
            search_url: cfg.search.search_url(),
            signals_url: format!("{}/rest/signals/add", cfg.signals_base_uri()),
            timeout: Duration::from_millis(cfg.search.timeout_ms),
        }
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, SearchError> {
        let resp = tokio::time::timeout(self.timeout, self.http.post(url, JSON, body))
            .await
            .map_err(|_| SearchError::Timeout(self.timeout.as_millis() as u64))?
            .map_err(to_search_error)?;
        if !resp.status.is_success() {
            let body = String::from_utf8_lossy(&resp.body).into_owned();
            tracing::error!(url, status = resp.status.as_u16(), %body, "search API error");
            return Err(SearchError::Status {
                status: resp.status.as_u16(),
                body,
            });
        }
        Ok(resp.body.to_vec())
    }
}

impl SearchBackend for SearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        tracing::debug!(url = %self.search_url, query = %request.query, rows = request.rows, "posting search request");
        let body = serde_json::to_vec(request)?;
        let bytes = self.post_json(&self.search_url, body).await?;
        let response: SearchResponse = serde_json::from_slice(&bytes)?;
        tracing::debug!(documents = response.documents.len(), "search response");
        Ok(response)
    }
}

impl SignalSink for SearchClient {
    async fn add_signals(&self, signals: &[Signal]) -> Result<(), SearchError> {
        let body = serde_json::to_vec(signals)?;
        self.post_json(&self.signals_url, body).await?;
        tracing::debug!(count = signals.len(), "signals recorded");
        Ok(())
    }
}

fn to_search_error(e: HttpError) -> SearchError {
    match e {
        HttpError::InvalidUrl(url) => SearchError::InvalidUrl(url),
        HttpError::UnsupportedScheme(scheme) => SearchError::UnsupportedProtocol(scheme),
        other => {
            tracing::error!(error = %other, "search transport failure");
            SearchError::Transport(other.to_string())
        }
    }
}
