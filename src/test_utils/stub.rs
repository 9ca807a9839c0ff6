use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::executor::Executor;
use crate::wire::{
    BeginTransactionRequest, BeginTransactionResponse, EndTransactionRequest,
    EndTransactionResponse, ExecuteStatementRequest, ExecuteStatementResponse, Field,
};

const VERSION_SQL: &str = "SELECT VERSION()";

/// One request seen by a [`StubExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Execute(ExecuteStatementRequest),
    Begin(BeginTransactionRequest),
    Commit(EndTransactionRequest),
    Rollback(EndTransactionRequest),
}

#[derive(Debug, Default)]
struct StubState {
    version_response: ExecuteStatementResponse,
    version_failures: usize,
    responses: VecDeque<Result<ExecuteStatementResponse, String>>,
    begin_failures: VecDeque<String>,
    commit_failures: VecDeque<String>,
    rollback_failures: VecDeque<String>,
    next_transaction: u64,
    latency: Option<Duration>,
    calls: Vec<RecordedCall>,
}

/// In-memory executor with scripted answers that records every request.
///
/// Version probes are answered from the configured version string; other statements pop the
/// scripted queue and get an empty response once it runs dry. Transactions are numbered
/// `tx-1`, `tx-2`, ...
#[derive(Debug, Default)]
pub struct StubExecutor {
    state: Mutex<StubState>,
}

impl StubExecutor {
    #[must_use]
    pub fn new(version: &str) -> Self {
        let stub = Self::default();
        stub.lock().version_response = version_response(version);
        stub
    }

    #[must_use]
    pub fn mysql() -> Self {
        Self::new("8.0.32")
    }

    #[must_use]
    pub fn postgres() -> Self {
        Self::new("PostgreSQL 13.7 on x86_64-pc-linux-gnu, compiled by gcc")
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer version probes with this response instead of a version string.
    pub fn set_version_response(&self, response: ExecuteStatementResponse) {
        self.lock().version_response = response;
    }

    /// Fail the next `count` version probes with a transport error.
    pub fn fail_version_probes(&self, count: usize) {
        self.lock().version_failures = count;
    }

    pub fn push_response(&self, response: ExecuteStatementResponse) {
        self.lock().responses.push_back(Ok(response));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.lock().responses.push_back(Err(message.into()));
    }

    pub fn fail_next_begin(&self, message: impl Into<String>) {
        self.lock().begin_failures.push_back(message.into());
    }

    pub fn fail_next_commit(&self, message: impl Into<String>) {
        self.lock().commit_failures.push_back(message.into());
    }

    pub fn fail_next_rollback(&self, message: impl Into<String>) {
        self.lock().rollback_failures.push_back(message.into());
    }

    /// Delay every answer, e.g. to race a cancellation.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Statement requests other than version probes, in order.
    #[must_use]
    pub fn statements(&self) -> Vec<ExecuteStatementRequest> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Execute(req) if req.sql != VERSION_SQL => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn version_probes(&self) -> usize {
        self.count(|c| matches!(c, RecordedCall::Execute(req) if req.sql == VERSION_SQL))
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.count(|c| matches!(c, RecordedCall::Commit(_)))
    }

    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.count(|c| matches!(c, RecordedCall::Rollback(_)))
    }

    fn count(&self, pred: impl Fn(&RecordedCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|&c| pred(c)).count()
    }

    async fn pause(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl Executor for StubExecutor {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, BoxError> {
        self.pause().await;
        let mut state = self.lock();
        let is_probe = request.sql == VERSION_SQL;
        state.calls.push(RecordedCall::Execute(request));

        if is_probe {
            if state.version_failures > 0 {
                state.version_failures -= 1;
                return Err("version probe throttled".into());
            }
            return Ok(state.version_response.clone());
        }

        match state.responses.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(message.into()),
            None => Ok(ExecuteStatementResponse::default()),
        }
    }

    async fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, BoxError> {
        self.pause().await;
        let mut state = self.lock();
        state.calls.push(RecordedCall::Begin(request));
        if let Some(message) = state.begin_failures.pop_front() {
            return Err(message.into());
        }
        state.next_transaction += 1;
        Ok(BeginTransactionResponse {
            transaction_id: format!("tx-{}", state.next_transaction),
        })
    }

    async fn commit_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, BoxError> {
        self.pause().await;
        let mut state = self.lock();
        state.calls.push(RecordedCall::Commit(request));
        if let Some(message) = state.commit_failures.pop_front() {
            return Err(message.into());
        }
        Ok(EndTransactionResponse {
            transaction_status: Some("Transaction Committed".to_string()),
        })
    }

    async fn rollback_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, BoxError> {
        self.pause().await;
        let mut state = self.lock();
        state.calls.push(RecordedCall::Rollback(request));
        if let Some(message) = state.rollback_failures.pop_front() {
            return Err(message.into());
        }
        Ok(EndTransactionResponse {
            transaction_status: Some("Rollback Complete".to_string()),
        })
    }
}

fn version_response(version: &str) -> ExecuteStatementResponse {
    ExecuteStatementResponse {
        records: vec![vec![Field::StringValue(version.to_string())]],
        ..ExecuteStatementResponse::default()
    }
}
