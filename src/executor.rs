use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, SqlDataApiError};
use crate::wire::{
    BeginTransactionRequest, BeginTransactionResponse, EndTransactionRequest,
    EndTransactionResponse, ExecuteStatementRequest, ExecuteStatementResponse,
};

/// The remote statement-execution service.
///
/// Each method is one independent request/response round trip; the service keeps no session
/// between calls other than the transaction id it hands out. Transport, signing and
/// authentication live in the implementation.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, BoxError>;

    async fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, BoxError>;

    async fn commit_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, BoxError>;

    async fn rollback_transaction(
        &self,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, BoxError>;
}

pub type SharedExecutor = Arc<dyn Executor>;

/// Run one remote call, giving up as soon as `cancel` fires.
///
/// Dropping the in-flight future is how cancellation reaches the transport.
pub(crate) async fn call_remote<T, F>(
    cancel: &CancellationToken,
    call: F,
) -> Result<T, SqlDataApiError>
where
    F: Future<Output = Result<T, BoxError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(SqlDataApiError::Cancelled),
        res = call => res.map_err(SqlDataApiError::RemoteCall),
    }
}

/// Run one remote call to completion regardless of cancellation.
pub(crate) async fn call_remote_uncancellable<T, F>(call: F) -> Result<T, SqlDataApiError>
where
    F: Future<Output = Result<T, BoxError>>,
{
    call.await.map_err(SqlDataApiError::RemoteCall)
}
