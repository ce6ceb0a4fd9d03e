//! HTTP implementation of [`QueryBackend`].
//!
//! Talks to the query service's two JSON endpoints:
//! - `POST /chat` with `{"question": ...}` → `{"sql_query": ..., "results": [...]}`
//! - `POST /execute_sql` with `{"sql": ...}` → `{"results": [...]}`
//!
//! Failures carry an optional `{"error": ...}` body.

use std::time::Duration;

use async_trait::async_trait;
use roster_core::config::ApiConfig;
use roster_core::Record;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{QueryAnswer, QueryBackend};
use crate::error::RemoteError;

/// Request body for `/chat`.
#[derive(Serialize)]
struct AskBody<'a> {
    question: &'a str,
}

/// Request body for `/execute_sql`.
#[derive(Serialize)]
struct ExecuteBody<'a> {
    sql: &'a str,
}

/// `/chat` response. Missing or null fields decode as empty.
#[derive(Deserialize)]
struct AskResponse {
    #[serde(default)]
    sql_query: Option<String>,
    #[serde(default)]
    results: Option<Vec<Record>>,
}

/// `/execute_sql` response. A missing `results` array decodes as no rows.
#[derive(Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    results: Option<Vec<Record>>,
}

/// Error payload returned alongside a non-success status.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Client for the query service REST API.
pub struct HttpBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Create a client with reqwest defaults (no request timeout).
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::new();
        Self { base_url, http }
    }

    /// Build from config, applying the optional request timeout.
    pub fn from_config(config: &ApiConfig) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, RemoteError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        debug!(url = %url, status = status.as_u16(), bytes = bytes.len(), "query service responded");

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty());
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn ask(&self, question: &str) -> Result<QueryAnswer, RemoteError> {
        let resp: AskResponse = self.post("/chat", &AskBody { question }).await?;
        Ok(QueryAnswer {
            sql_query: resp.sql_query.unwrap_or_default(),
            results: resp.results.unwrap_or_default(),
        })
    }

    async fn execute_sql(&self, sql: &str) -> Result<Vec<Record>, RemoteError> {
        let resp: ExecuteResponse = self.post("/execute_sql", &ExecuteBody { sql }).await?;
        Ok(resp.results.unwrap_or_default())
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}
