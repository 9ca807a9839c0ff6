use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::dialect::Dialect;
use crate::error::SqlDataApiError;
use crate::executor::{SharedExecutor, call_remote, call_remote_uncancellable};
use crate::results::{ExecResult, ResultCursor};
use crate::statement::Statement;
use crate::transaction::Transaction;
use crate::types::{NamedValue, TxOptions};
use crate::wire::{
    BeginTransactionRequest, EndTransactionRequest, ExecuteStatementRequest,
    ExecuteStatementResponse, SqlParameter,
};

const PING_SQL: &str = "/* ping */ SELECT 1";

/// What a connection shares with the statements it prepares.
#[derive(Clone)]
pub(crate) struct Session {
    pub(crate) config: Arc<Config>,
    pub(crate) executor: SharedExecutor,
    pub(crate) dialect: Dialect,
    /// Id of the open transaction, shared with every statement prepared on the connection.
    open_transaction: Arc<Mutex<Option<String>>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("database", &self.config.database)
            .field("dialect", &self.dialect)
            .field("open_transaction", &self.open_transaction())
            .finish_non_exhaustive()
    }
}

impl Session {
    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.open_transaction
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn open_transaction(&self) -> Option<String> {
        self.slot().clone()
    }

    fn set_open_transaction(&self, id: Option<String>) {
        *self.slot() = id;
    }

    fn statement_request(
        &self,
        sql: String,
        parameters: Vec<SqlParameter>,
        transaction_id: Option<&str>,
        include_result_metadata: bool,
    ) -> ExecuteStatementRequest {
        ExecuteStatementRequest {
            resource_arn: self.config.resource_arn.clone(),
            secret_arn: self.config.secret_arn.clone(),
            database: self.config.database.clone(),
            transaction_id: transaction_id.map(str::to_string),
            sql,
            parameters,
            include_result_metadata,
        }
    }

    pub(crate) async fn execute(
        &self,
        cancel: &CancellationToken,
        sql: String,
        parameters: Vec<SqlParameter>,
        transaction_id: Option<&str>,
    ) -> Result<ExecuteStatementResponse, SqlDataApiError> {
        debug!(sql = %sql, transaction_id, params = parameters.len(), "execute statement");
        let request = self.statement_request(sql, parameters, transaction_id, true);
        call_remote(cancel, self.executor.execute_statement(request)).await
    }

    fn end_request(&self, transaction_id: &str) -> EndTransactionRequest {
        EndTransactionRequest {
            resource_arn: self.config.resource_arn.clone(),
            secret_arn: self.config.secret_arn.clone(),
            transaction_id: transaction_id.to_string(),
        }
    }

    pub(crate) async fn commit(
        &self,
        cancel: &CancellationToken,
        transaction_id: &str,
    ) -> Result<(), SqlDataApiError> {
        debug!(transaction_id, "commit transaction");
        let request = self.end_request(transaction_id);
        call_remote(cancel, self.executor.commit_transaction(request)).await?;
        Ok(())
    }

    pub(crate) async fn rollback(
        &self,
        cancel: &CancellationToken,
        transaction_id: &str,
    ) -> Result<(), SqlDataApiError> {
        debug!(transaction_id, "rollback transaction");
        let request = self.end_request(transaction_id);
        call_remote(cancel, self.executor.rollback_transaction(request)).await?;
        Ok(())
    }

    /// Rollback that runs to completion even after the caller gave up.
    pub(crate) async fn rollback_uncancellable(
        &self,
        transaction_id: &str,
    ) -> Result<(), SqlDataApiError> {
        debug!(transaction_id, "rollback transaction (uncancellable)");
        let request = self.end_request(transaction_id);
        call_remote_uncancellable(self.executor.rollback_transaction(request)).await?;
        Ok(())
    }
}

/// Whether a connection currently tracks an open transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Ready,
    TxOpen,
}

/// A logical session against the remote service.
///
/// Holds no socket: every call is an independent round trip. The dialect is fixed when the
/// connection is created and never probed again. Not meant for concurrent use; wrap it in
/// your own lock or pool if several tasks need it.
#[derive(Debug)]
pub struct Connection {
    session: Session,
}

impl Connection {
    pub(crate) fn new(config: Arc<Config>, executor: SharedExecutor, dialect: Dialect) -> Self {
        Self {
            session: Session {
                config,
                executor,
                dialect,
                open_transaction: Arc::new(Mutex::new(None)),
            },
        }
    }

    #[must_use]
    pub fn dialect(&self) -> &Dialect {
        &self.session.dialect
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.session.config
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        if self.session.open_transaction().is_some() {
            ConnectionState::TxOpen
        } else {
            ConnectionState::Ready
        }
    }

    /// Prepare a single SQL text. Nothing is sent until the statement runs, and it runs in
    /// whatever transaction is open on the connection at that time.
    #[must_use]
    pub fn prepare(&self, sql: impl Into<String>) -> Statement {
        Statement::new(self.session.clone(), vec![sql.into()], None)
    }

    /// Prepare several texts that run in order, as one statement.
    #[must_use]
    pub fn prepare_batch(&self, queries: Vec<String>) -> Statement {
        Statement::new(self.session.clone(), queries, None)
    }

    /// Execute a statement that returns no rows.
    ///
    /// # Errors
    /// Returns `SqlDataApiError` if the arguments cannot be encoded or the remote call fails.
    pub async fn exec(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        args: &[NamedValue],
    ) -> Result<ExecResult, SqlDataApiError> {
        self.prepare(sql).exec(cancel, args).await
    }

    /// Execute a statement and return a cursor over its rows.
    ///
    /// # Errors
    /// Returns `SqlDataApiError` if the arguments cannot be encoded or the remote call fails.
    pub async fn query(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        args: &[NamedValue],
    ) -> Result<ResultCursor, SqlDataApiError> {
        self.prepare(sql).query(cancel, args).await
    }

    /// Check that the database answers.
    ///
    /// # Errors
    /// Returns `SqlDataApiError::RemoteCall` if the probe fails.
    pub async fn ping(&self, cancel: &CancellationToken) -> Result<(), SqlDataApiError> {
        debug!("ping");
        let request = self
            .session
            .statement_request(PING_SQL.to_string(), Vec::new(), None, false);
        call_remote(cancel, self.session.executor.execute_statement(request)).await?;
        Ok(())
    }

    /// Open a remote transaction.
    ///
    /// A non-default isolation level or read-only mode is applied with a `SET TRANSACTION`
    /// statement inside the new transaction. If that statement fails the transaction is rolled
    /// back before the error is returned; the rollback ignores `cancel`.
    ///
    /// # Errors
    /// `TransactionState` if a transaction is already tracked, `UnsupportedIsolationLevel`,
    /// `RemoteCall`, or `CompensationFailed` when the rollback after a failed prelude also fails.
    pub async fn begin(
        &mut self,
        cancel: &CancellationToken,
        opts: TxOptions,
    ) -> Result<Transaction<'_>, SqlDataApiError> {
        if let Some(open) = self.session.open_transaction() {
            return Err(SqlDataApiError::TransactionState(format!(
                "transaction {open} is already open on this connection"
            )));
        }
        if !self.session.dialect.is_isolation_level_supported(opts.isolation) {
            return Err(SqlDataApiError::UnsupportedIsolationLevel(opts.isolation));
        }

        let request = BeginTransactionRequest {
            resource_arn: self.session.config.resource_arn.clone(),
            secret_arn: self.session.config.secret_arn.clone(),
            database: self.session.config.database.clone(),
        };
        let response =
            call_remote(cancel, self.session.executor.begin_transaction(request)).await?;
        let id = response.transaction_id;
        debug!(transaction_id = %id, "began transaction");

        if let Some(prelude) = transaction_prelude(opts)
            && let Err(primary) = self
                .session
                .execute(cancel, prelude, Vec::new(), Some(&id))
                .await
        {
            return Err(self.compensate(&id, primary).await);
        }

        self.session.set_open_transaction(Some(id.clone()));
        Ok(Transaction::new(self, id))
    }

    async fn compensate(&self, id: &str, primary: SqlDataApiError) -> SqlDataApiError {
        match self.session.rollback_uncancellable(id).await {
            Ok(()) => primary,
            Err(rollback) => {
                warn!(transaction_id = id, error = %rollback, "compensating rollback failed");
                SqlDataApiError::CompensationFailed {
                    primary: Box::new(primary),
                    rollback: Box::new(rollback),
                }
            }
        }
    }

    /// Close the connection. The service keeps nothing per connection, so this only consumes it.
    ///
    /// # Errors
    /// Never fails today; kept fallible for callers that treat close as a remote operation.
    pub fn close(self) -> Result<(), SqlDataApiError> {
        Ok(())
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn clear_transaction(&mut self) {
        self.session.set_open_transaction(None);
    }
}

/// `SET TRANSACTION ...` for the requested options, or `None` when defaults suffice.
fn transaction_prelude(opts: TxOptions) -> Option<String> {
    let mut clauses = Vec::with_capacity(2);
    if opts.isolation != crate::types::IsolationLevel::Default {
        clauses.push(format!("ISOLATION LEVEL {}", opts.isolation.as_sql()));
    }
    if opts.read_only {
        clauses.push("READ ONLY".to_string());
    }
    if clauses.is_empty() {
        None
    } else {
        Some(format!("SET TRANSACTION {}", clauses.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IsolationLevel;

    #[test]
    fn prelude_text() {
        assert_eq!(transaction_prelude(TxOptions::default()), None);
        assert_eq!(
            transaction_prelude(TxOptions::default().with_isolation(IsolationLevel::Serializable)),
            Some("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE".to_string())
        );
        assert_eq!(
            transaction_prelude(
                TxOptions::default()
                    .with_isolation(IsolationLevel::ReadCommitted)
                    .with_read_only(true)
            ),
            Some("SET TRANSACTION ISOLATION LEVEL READ COMMITTED, READ ONLY".to_string())
        );
        assert_eq!(
            transaction_prelude(TxOptions::default().with_read_only(true)),
            Some("SET TRANSACTION READ ONLY".to_string())
        );
    }
}
