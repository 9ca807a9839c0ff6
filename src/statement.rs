use tokio_util::sync::CancellationToken;

use crate::connection::Session;
use crate::error::SqlDataApiError;
use crate::results::{ExecResult, ResultCursor};
use crate::types::NamedValue;
use crate::wire::ExecuteStatementResponse;

/// One or more SQL texts run in order with the same arguments.
///
/// Nothing is cached remotely; every run sends the full text and parameters again. A statement
/// prepared on a connection joins the transaction open on it when it runs. A statement prepared
/// on a transaction only runs while that transaction is still open.
#[derive(Debug, Clone)]
pub struct Statement {
    session: Session,
    queries: Vec<String>,
    transaction_id: Option<String>,
}

impl Statement {
    pub(crate) fn new(
        session: Session,
        queries: Vec<String>,
        transaction_id: Option<String>,
    ) -> Self {
        Self {
            session,
            queries,
            transaction_id,
        }
    }

    #[must_use]
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Transaction the statement was prepared on, if any.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    /// Number of placeholders. Always unknown: markers are only counted while rewriting.
    #[must_use]
    pub fn num_input(&self) -> Option<usize> {
        None
    }

    /// Run every text and aggregate the row counts and generated id.
    ///
    /// # Errors
    /// The first encoding or remote failure; later texts are not sent.
    pub async fn exec(
        &self,
        cancel: &CancellationToken,
        args: &[NamedValue],
    ) -> Result<ExecResult, SqlDataApiError> {
        let responses = self.run(cancel, args).await?;
        Ok(ExecResult::from_responses(&responses))
    }

    /// Run every text and return a cursor with one result set per text.
    ///
    /// # Errors
    /// The first encoding or remote failure; later texts are not sent.
    pub async fn query(
        &self,
        cancel: &CancellationToken,
        args: &[NamedValue],
    ) -> Result<ResultCursor, SqlDataApiError> {
        let responses = self.run(cancel, args).await?;
        Ok(ResultCursor::new(self.session.dialect.clone(), responses))
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
        args: &[NamedValue],
    ) -> Result<Vec<ExecuteStatementResponse>, SqlDataApiError> {
        let transaction_id = self.transaction_for_run()?;
        let mut responses = Vec::with_capacity(self.queries.len());
        for query in &self.queries {
            let rewritten = self.session.dialect.rewrite_query(query, args)?;
            let response = self
                .session
                .execute(
                    cancel,
                    rewritten.sql,
                    rewritten.parameters,
                    transaction_id.as_deref(),
                )
                .await?;
            responses.push(response);
        }
        Ok(responses)
    }

    fn transaction_for_run(&self) -> Result<Option<String>, SqlDataApiError> {
        let open = self.session.open_transaction();
        match &self.transaction_id {
            None => Ok(open),
            Some(bound) if open.as_deref() == Some(bound.as_str()) => Ok(open),
            Some(_) => Err(SqlDataApiError::tx_done()),
        }
    }
}
