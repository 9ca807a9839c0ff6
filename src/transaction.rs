use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::connection::Connection;
use crate::error::SqlDataApiError;
use crate::results::{ExecResult, ResultCursor};
use crate::statement::Statement;
use crate::types::NamedValue;

/// A remote transaction opened by [`Connection::begin`].
///
/// Borrows its connection mutably, so no second transaction can be opened until this one is
/// finished or dropped. Commit and rollback each succeed at most once; any later call fails
/// with `TransactionState` without reaching the service, as does running a statement prepared
/// on it. Dropping an unfinished transaction rolls it back in the background on the current
/// tokio runtime; outside a runtime the rollback cannot be scheduled and the remote
/// transaction is left to the service's timeout.
#[derive(Debug)]
pub struct Transaction<'c> {
    conn: &'c mut Connection,
    id: String,
    done: bool,
}

impl<'c> Transaction<'c> {
    pub(crate) fn new(conn: &'c mut Connection, id: String) -> Self {
        Self {
            conn,
            id,
            done: false,
        }
    }

    /// Opaque id handed out by the service.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn ensure_active(&self) -> Result<(), SqlDataApiError> {
        if self.done {
            Err(SqlDataApiError::tx_done())
        } else {
            Ok(())
        }
    }

    /// Prepare a statement bound to this transaction.
    ///
    /// # Errors
    /// `TransactionState` once the transaction is finished.
    pub fn prepare(&self, sql: impl Into<String>) -> Result<Statement, SqlDataApiError> {
        self.ensure_active()?;
        Ok(Statement::new(
            self.conn.session().clone(),
            vec![sql.into()],
            Some(self.id.clone()),
        ))
    }

    /// # Errors
    /// `TransactionState` once finished, otherwise as [`Statement::exec`].
    pub async fn exec(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        args: &[NamedValue],
    ) -> Result<ExecResult, SqlDataApiError> {
        self.prepare(sql)?.exec(cancel, args).await
    }

    /// # Errors
    /// `TransactionState` once finished, otherwise as [`Statement::query`].
    pub async fn query(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        args: &[NamedValue],
    ) -> Result<ResultCursor, SqlDataApiError> {
        self.prepare(sql)?.query(cancel, args).await
    }

    /// Commit. A failed commit leaves the transaction open so it can still be rolled back.
    ///
    /// # Errors
    /// `TransactionState` if already finished, or the remote failure.
    pub async fn commit(&mut self, cancel: &CancellationToken) -> Result<(), SqlDataApiError> {
        self.ensure_active()?;
        self.conn.session().commit(cancel, &self.id).await?;
        self.finish();
        Ok(())
    }

    /// Roll back.
    ///
    /// # Errors
    /// `TransactionState` if already finished, or the remote failure.
    pub async fn rollback(&mut self, cancel: &CancellationToken) -> Result<(), SqlDataApiError> {
        self.ensure_active()?;
        self.conn.session().rollback(cancel, &self.id).await?;
        self.finish();
        Ok(())
    }

    fn finish(&mut self) {
        self.done = true;
        self.conn.clear_transaction();
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.conn.clear_transaction();
        warn!(transaction_id = %self.id, "transaction dropped without commit or rollback");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let session = self.conn.session().clone();
                let id = std::mem::take(&mut self.id);
                handle.spawn(async move {
                    if let Err(e) = session.rollback_uncancellable(&id).await {
                        warn!(transaction_id = %id, error = %e, "background rollback failed");
                    }
                });
            }
            Err(e) => {
                warn!(
                    transaction_id = %self.id,
                    error = %e,
                    "no tokio runtime, rollback of dropped transaction not scheduled"
                );
            }
        }
    }
}
