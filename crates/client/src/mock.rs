//! Scripted [`QueryBackend`] for tests that should not touch the network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use roster_core::Record;

use crate::backend::{QueryAnswer, QueryBackend};
use crate::error::RemoteError;

/// A mock backend that returns pre-configured responses.
///
/// `ask` answers are consumed in queue order. `execute_sql` results are keyed
/// by the exact SQL text and may be served any number of times; unknown SQL
/// fails with a transport error.
#[derive(Default)]
pub struct MockBackend {
    answers: Mutex<VecDeque<Result<QueryAnswer, RemoteError>>>,
    sql_results: Mutex<HashMap<String, Result<Vec<Record>, RemoteError>>>,
    questions: Mutex<Vec<String>>,
    executed: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer for the next `ask`.
    pub fn queue_answer(&self, sql_query: &str, results: Vec<Record>) {
        self.answers.lock().unwrap().push_back(Ok(QueryAnswer {
            sql_query: sql_query.to_string(),
            results,
        }));
    }

    /// Queue a failure for the next `ask`.
    pub fn queue_ask_error(&self, error: RemoteError) {
        self.answers.lock().unwrap().push_back(Err(error));
    }

    /// Serve `rows` whenever `sql` is executed.
    pub fn respond_sql(&self, sql: &str, rows: Vec<Record>) {
        self.sql_results.lock().unwrap().insert(sql.to_string(), Ok(rows));
    }

    /// Fail whenever `sql` is executed.
    pub fn fail_sql(&self, sql: &str, error: RemoteError) {
        self.sql_results.lock().unwrap().insert(sql.to_string(), Err(error));
    }

    /// Questions received so far, in call order.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    /// SQL statements received so far, in call order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

/// Build a record from a JSON object literal. Panics on non-objects.
pub fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("record() expects a JSON object, got {other}"),
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    async fn ask(&self, question: &str) -> Result<QueryAnswer, RemoteError> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteError::Transport("no queued answer".into())))
    }

    async fn execute_sql(&self, sql: &str) -> Result<Vec<Record>, RemoteError> {
        self.executed.lock().unwrap().push(sql.to_string());
        self.sql_results
            .lock()
            .unwrap()
            .get(sql)
            .cloned()
            .unwrap_or_else(|| Err(RemoteError::Transport(format!("no canned result for: {sql}"))))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
