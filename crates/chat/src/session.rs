//! Chat session: one question in flight at a time, an append-only
//! transcript, and the latest successful result.
//!
//! ```text
//! Idle --submit--> Sending --answer--> Idle
//!                          --failure--> Idle
//! ```
//!
//! A submit that arrives while `Sending`, or carries a blank question, is
//! rejected without touching the transcript. A request that never resolves
//! leaves the session in `Sending`; no timeout is applied here.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use roster_client::QueryBackend;
use roster_viz::{QueryResult, ResultPresenter};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::transcript::TranscriptEntry;

/// Shown when the service gave no message of its own.
pub const GENERIC_FAILURE: &str = "Failed to process your request";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Sending,
}

/// Why a submit was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyQuestion,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(Rejection),
    Answered { row_count: usize },
    Failed { message: String },
}

#[derive(Debug, Default)]
struct SessionState {
    phase: Phase,
    transcript: Vec<TranscriptEntry>,
    current: Option<QueryResult>,
}

pub struct ConversationSession {
    backend: Arc<dyn QueryBackend>,
    chart_row_limit: Option<usize>,
    state: Mutex<SessionState>,
}

impl ConversationSession {
    /// Starts `Idle` with an empty transcript and no result.
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            backend,
            chart_row_limit: None,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Cap applied to presenters handed out by [`presenter`](Self::presenter).
    pub fn with_chart_row_limit(mut self, limit: usize) -> Self {
        self.chart_row_limit = Some(limit);
        self
    }

    // Every mutation leaves the state consistent, so poisoning is ignored.
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn submit(&self, question: &str) -> SubmitOutcome {
        {
            let mut state = self.state();
            if question.trim().is_empty() {
                debug!("ignoring blank question");
                return SubmitOutcome::Rejected(Rejection::EmptyQuestion);
            }
            if state.phase == Phase::Sending {
                debug!("ignoring question while a request is in flight");
                return SubmitOutcome::Rejected(Rejection::Busy);
            }
            state.transcript.push(TranscriptEntry::user(question));
            state.phase = Phase::Sending;
        }

        let start = Instant::now();
        info!(backend = self.backend.backend_name(), "submitting question");
        let response = self.backend.ask(question).await;

        let mut state = self.state();
        state.phase = Phase::Idle;
        match response {
            Ok(answer) => {
                let row_count = answer.results.len();
                info!(
                    rows = row_count,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "question answered"
                );
                state.transcript.push(TranscriptEntry::assistant(
                    format!("Found {row_count} results"),
                    answer.sql_query.clone(),
                ));
                state.current = Some(QueryResult::new(answer.sql_query, answer.results));
                SubmitOutcome::Answered { row_count }
            }
            Err(e) => {
                warn!(error = %e, "question failed");
                let message = e.server_message().unwrap_or(GENERIC_FAILURE).to_string();
                state.transcript.push(TranscriptEntry::error(message.clone()));
                SubmitOutcome::Failed { message }
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    /// Copy of the transcript, oldest first.
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.state().transcript.clone()
    }

    pub fn transcript_len(&self) -> usize {
        self.state().transcript.len()
    }

    /// The most recent successful result, if any.
    pub fn current_result(&self) -> Option<QueryResult> {
        self.state().current.clone()
    }

    pub fn presenter(&self) -> Option<ResultPresenter> {
        let result = self.current_result()?;
        let presenter = ResultPresenter::new(result);
        Some(match self.chart_row_limit {
            Some(limit) => presenter.with_chart_row_limit(limit),
            None => presenter,
        })
    }
}
