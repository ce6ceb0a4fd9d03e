use std::ops::Index;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use indexmap::IndexMap;
use roster_client::QueryBackend;
use roster_core::Record;
use tracing::{debug, info, warn};

use crate::catalog::AggregateQuery;

/// Rows per catalog entry, in catalog order.
///
/// Produced only by [`QueryFanoutExecutor::run`], which guarantees every
/// catalog name is present. A failed entry holds no rows and its error text
/// is kept in [`failures`](Self::failures).
#[derive(Debug, Clone, Default)]
pub struct NamedResultBundle {
    entries: IndexMap<String, Vec<Record>>,
    failures: IndexMap<String, String>,
}

impl NamedResultBundle {
    fn with_capacity(n: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(n),
            failures: IndexMap::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, Vec<Record>)>) -> Self {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            failures: IndexMap::new(),
        }
    }

    /// Rows filed under `name`, or `None` if the name was not in the catalog.
    pub fn get(&self, name: &str) -> Option<&[Record]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// First row of `name`, if it produced any.
    pub fn first_row(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(|rows| rows.first())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, error)` for every entry whose remote call failed.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.failures.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_failed(&self, name: &str) -> bool {
        self.failures.contains_key(name)
    }
}

impl Index<&str> for NamedResultBundle {
    type Output = [Record];

    /// Panics when `name` is not a catalog entry.
    fn index(&self, name: &str) -> &[Record] {
        match self.get(name) {
            Some(rows) => rows,
            None => panic!("query '{name}' is not part of the catalog"),
        }
    }
}

/// Runs a catalog against the query service, all entries at once.
pub struct QueryFanoutExecutor {
    backend: Arc<dyn QueryBackend>,
}

impl QueryFanoutExecutor {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self { backend }
    }

    /// Dispatch every entry concurrently and wait for all of them.
    ///
    /// A failing entry is logged and filed with no rows; it never affects its
    /// siblings and never surfaces as an error here.
    pub async fn run(&self, catalog: &[AggregateQuery]) -> NamedResultBundle {
        let start = Instant::now();

        info!(
            queries = catalog.len(),
            backend = self.backend.backend_name(),
            "running dashboard queries"
        );

        let futures: Vec<_> = catalog
            .iter()
            .map(|query| self.backend.execute_sql(query.sql))
            .collect();

        let results = join_all(futures).await;

        let mut bundle = NamedResultBundle::with_capacity(catalog.len());
        for (query, result) in catalog.iter().zip(results) {
            match result {
                Ok(rows) => {
                    debug!(query = query.name, rows = rows.len(), "dashboard query succeeded");
                    bundle.entries.insert(query.name.to_string(), rows);
                }
                Err(e) => {
                    warn!(query = query.name, error = %e, "dashboard query failed");
                    bundle.entries.insert(query.name.to_string(), Vec::new());
                    bundle.failures.insert(query.name.to_string(), e.to_string());
                }
            }
        }

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            failed = bundle.failures.len(),
            "dashboard queries settled"
        );

        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DASHBOARD_CATALOG;
    use roster_client::mock::{record, MockBackend};
    use roster_client::RemoteError;
    use serde_json::json;

    const CATALOG: &[AggregateQuery] = &[
        AggregateQuery { name: "a", sql: "SELECT a" },
        AggregateQuery { name: "b", sql: "SELECT b" },
        AggregateQuery { name: "c", sql: "SELECT c" },
    ];

    #[tokio::test]
    async fn every_name_present_when_all_fail() {
        let mock = Arc::new(MockBackend::new());
        let bundle = QueryFanoutExecutor::new(mock.clone()).run(DASHBOARD_CATALOG).await;

        let names: Vec<&str> = bundle.names().collect();
        let expected: Vec<&str> = DASHBOARD_CATALOG.iter().map(|q| q.name).collect();
        assert_eq!(names, expected);
        assert!(DASHBOARD_CATALOG.iter().all(|q| bundle[q.name].is_empty()));
        assert_eq!(bundle.failures().count(), DASHBOARD_CATALOG.len());
        assert_eq!(mock.executed().len(), DASHBOARD_CATALOG.len());
    }

    #[tokio::test]
    async fn failure_is_isolated() {
        let mock = Arc::new(MockBackend::new());
        mock.respond_sql("SELECT a", vec![record(json!({"n": 1}))]);
        mock.fail_sql("SELECT b", RemoteError::Transport("connection reset".into()));
        mock.respond_sql("SELECT c", vec![record(json!({"n": 3})), record(json!({"n": 4}))]);

        let bundle = QueryFanoutExecutor::new(mock).run(CATALOG).await;

        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle["a"].len(), 1);
        assert!(bundle["b"].is_empty());
        assert_eq!(bundle["c"].len(), 2);
        assert!(bundle.is_failed("b"));
        assert!(!bundle.is_failed("a"));
        let failures: Vec<(&str, &str)> = bundle.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "b");
        assert!(failures[0].1.contains("connection reset"));
    }

    #[tokio::test]
    async fn empty_catalog_gives_empty_bundle() {
        let bundle = QueryFanoutExecutor::new(Arc::new(MockBackend::new())).run(&[]).await;
        assert!(bundle.is_empty());
    }

    #[tokio::test]
    #[should_panic(expected = "not part of the catalog")]
    async fn indexing_unknown_name_panics() {
        let bundle = QueryFanoutExecutor::new(Arc::new(MockBackend::new())).run(CATALOG).await;
        let _ = &bundle["zzz"];
    }

    #[test]
    fn first_row_lookup() {
        let mut bundle = NamedResultBundle::default();
        bundle.entries.insert("a".into(), vec![record(json!({"n": 1}))]);
        bundle.entries.insert("b".into(), Vec::new());
        assert!(bundle.first_row("a").is_some());
        assert!(bundle.first_row("b").is_none());
        assert!(bundle.first_row("c").is_none());
    }
}
