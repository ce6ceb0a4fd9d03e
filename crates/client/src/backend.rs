use async_trait::async_trait;
use roster_core::Record;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Answer to a natural-language question: the query the service generated
/// and the rows it produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub sql_query: String,
    pub results: Vec<Record>,
}

/// The query service as seen from the analytics view.
///
/// Implementations own transport concerns (addressing, framing, timeouts).
/// Callers only see rows or a [`RemoteError`].
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Turn a free-text question into a query, run it, and return both.
    async fn ask(&self, question: &str) -> Result<QueryAnswer, RemoteError>;

    /// Run an aggregate query verbatim and return its rows.
    async fn execute_sql(&self, sql: &str) -> Result<Vec<Record>, RemoteError>;

    /// Backend name for logging (e.g. "http", "mock").
    fn backend_name(&self) -> &str;
}
