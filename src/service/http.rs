//! REST client for the suggestion service.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  /suggest?prefix=..&limit=..` -> [`SuggestResponse`]
//! - `POST /submit` `{"term": ..}`       -> [`TermRecord`]
//! - `GET  /top?limit=..`               -> `[Suggestion]`
//! - `POST /init`                       -> confirmation text

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ServiceError, SuggestionService};
use crate::config::AppConfig;
use crate::model::types::{SubmitRequest, SuggestResponse, Suggestion, TermRecord};

/// Longest response body echoed into a [`ServiceError::Status`].
const ERROR_BODY_PREVIEW: usize = 200;

/// Explicitly constructed HTTP transport. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpSuggestionService {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpSuggestionService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        // A trailing slash keeps `Url::join` from replacing the last segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ServiceError::InvalidRequest(format!("base url {base_url:?}: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("typeahead/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        Self::new(&config.api_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ServiceError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ServiceError::InvalidRequest(format!("endpoint {path}: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn map_err(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }

    async fn check(&self, response: Response) -> Result<Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > ERROR_BODY_PREVIEW {
            let mut cut = ERROR_BODY_PREVIEW;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ServiceError> {
        let response = self.check(response).await?;
        response.json::<T>().await.map_err(|e| self.map_err(e))
    }
}

impl SuggestionService for HttpSuggestionService {
    async fn suggest(&self, prefix: &str, limit: usize) -> Result<SuggestResponse, ServiceError> {
        let limit = limit.to_string();
        let url = self.endpoint("suggest", &[("prefix", prefix), ("limit", &limit)])?;
        debug!(%url, "GET suggest");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        self.read_json(response).await
    }

    async fn submit(&self, term: &str) -> Result<TermRecord, ServiceError> {
        let url = self.endpoint("submit", &[])?;
        debug!(%url, term, "POST submit");
        let body = SubmitRequest {
            term: term.to_string(),
        };
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        self.read_json(response).await
    }

    async fn top(&self, limit: usize) -> Result<Vec<Suggestion>, ServiceError> {
        let limit = limit.to_string();
        let url = self.endpoint("top", &[("limit", &limit)])?;
        debug!(%url, "GET top");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        self.read_json(response).await
    }

    async fn init(&self) -> Result<String, ServiceError> {
        let url = self.endpoint("init", &[])?;
        debug!(%url, "POST init");
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        let response = self.check(response).await?;
        response.text().await.map_err(|e| self.map_err(e))
    }
}
