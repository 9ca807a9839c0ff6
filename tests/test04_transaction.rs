use std::sync::Arc;
use std::time::Duration;

use sql_dataapi::prelude::*;
use sql_dataapi::test_utils::{RecordedCall, StubExecutor};

async fn connect(stub: &Arc<StubExecutor>) -> Result<Connection, SqlDataApiError> {
    let cfg = Config::new("arn:cluster", "arn:secret", "app");
    Connector::new(cfg, stub.clone())?
        .connect(&CancellationToken::new())
        .await
}

#[tokio::test]
async fn statements_carry_transaction_id() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    let mut tx = conn.begin(&token, TxOptions::default()).await?;
    assert_eq!(tx.id(), "tx-1");
    tx.exec(&token, "UPDATE t SET a = ?", &NamedValue::ordinal_args(vec![RowValues::Int(1)]))
        .await?;
    let stmt = tx.prepare("DELETE FROM t")?;
    assert_eq!(stmt.transaction_id(), Some("tx-1"));
    stmt.exec(&token, &[]).await?;
    tx.commit(&token).await?;
    assert!(tx.is_done());
    drop(tx);

    let statements = stub.statements();
    assert_eq!(statements.len(), 2);
    assert!(
        statements
            .iter()
            .all(|s| s.transaction_id.as_deref() == Some("tx-1"))
    );
    assert_eq!(conn.state(), ConnectionState::Ready);

    conn.exec(&token, "SELECT 1", &[]).await?;
    assert_eq!(stub.statements()[2].transaction_id, None);
    Ok(())
}

#[tokio::test]
async fn default_options_send_no_prelude() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::postgres());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    let mut tx = conn.begin(&token, TxOptions::default()).await?;
    tx.rollback(&token).await?;
    drop(tx);
    assert!(stub.statements().is_empty());
    assert_eq!(stub.rollbacks(), 1);
    Ok(())
}

#[tokio::test]
async fn isolation_and_read_only_prelude() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    let opts = TxOptions::default()
        .with_isolation(IsolationLevel::Serializable)
        .with_read_only(true);
    let mut tx = conn.begin(&token, opts).await?;
    let id = tx.id().to_string();
    tx.commit(&token).await?;
    drop(tx);

    let statements = stub.statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].sql,
        "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE, READ ONLY"
    );
    assert_eq!(statements[0].transaction_id.as_deref(), Some(id.as_str()));
    Ok(())
}

#[tokio::test]
async fn unsupported_isolation_is_rejected_before_any_call() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::postgres());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;
    let before = stub.calls().len();

    for level in [
        IsolationLevel::Snapshot,
        IsolationLevel::WriteCommitted,
        IsolationLevel::Linearizable,
    ] {
        let err = conn
            .begin(&token, TxOptions::default().with_isolation(level))
            .await
            .unwrap_err();
        assert!(matches!(err, SqlDataApiError::UnsupportedIsolationLevel(l) if l == level));
    }
    assert_eq!(stub.calls().len(), before);
    Ok(())
}

#[tokio::test]
async fn failed_prelude_rolls_back_and_returns_original_error() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    stub.push_error("prelude refused");
    let err = conn
        .begin(
            &token,
            TxOptions::default().with_isolation(IsolationLevel::ReadCommitted),
        )
        .await
        .unwrap_err();
    match &err {
        SqlDataApiError::RemoteCall(cause) => assert_eq!(cause.to_string(), "prelude refused"),
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(conn.state(), ConnectionState::Ready);
    let rollbacks: Vec<_> = stub
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            RecordedCall::Rollback(req) => Some(req.transaction_id),
            _ => None,
        })
        .collect();
    assert_eq!(rollbacks, vec!["tx-1".to_string()]);

    // connection is still usable for a new transaction
    let mut tx = conn.begin(&token, TxOptions::default()).await?;
    assert_eq!(tx.id(), "tx-2");
    tx.commit(&token).await?;
    Ok(())
}

#[tokio::test]
async fn compensating_rollback_ignores_cancellation() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let mut conn = connect(&stub).await?;

    // begin answers after 200ms; the token fires while the prelude is in flight
    stub.set_latency(Duration::from_millis(200));
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        canceller.cancel();
    });

    let err = conn
        .begin(&token, TxOptions::default().with_read_only(true))
        .await
        .unwrap_err();
    assert!(matches!(err, SqlDataApiError::Cancelled));
    assert_eq!(stub.rollbacks(), 1);
    assert_eq!(conn.state(), ConnectionState::Ready);
    Ok(())
}

#[tokio::test]
async fn failed_compensation_is_attached_to_primary_error() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    stub.push_error("prelude refused");
    stub.fail_next_rollback("rollback refused");
    let err = conn
        .begin(
            &token,
            TxOptions::default().with_isolation(IsolationLevel::RepeatableRead),
        )
        .await
        .unwrap_err();
    match &err {
        SqlDataApiError::CompensationFailed { primary, rollback } => {
            assert_eq!(primary.to_string(), "Remote call failed: prelude refused");
            assert_eq!(rollback.to_string(), "Remote call failed: rollback refused");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(err.primary(), SqlDataApiError::RemoteCall(_)));
    assert_eq!(conn.state(), ConnectionState::Ready);
    Ok(())
}

#[tokio::test]
async fn commit_twice_sends_one_commit() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    let mut tx = conn.begin(&token, TxOptions::default()).await?;
    tx.commit(&token).await?;
    let err = tx.commit(&token).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::TransactionState(_)));
    let err = tx.rollback(&token).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::TransactionState(_)));
    let err = tx.exec(&token, "SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::TransactionState(_)));
    drop(tx);

    assert_eq!(stub.commits(), 1);
    assert_eq!(stub.rollbacks(), 0);
    Ok(())
}

#[tokio::test]
async fn rollback_twice_sends_one_rollback() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::postgres());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    let mut tx = conn.begin(&token, TxOptions::default()).await?;
    tx.rollback(&token).await?;
    let err = tx.rollback(&token).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::TransactionState(_)));
    drop(tx);

    assert_eq!(stub.rollbacks(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_commit_leaves_transaction_open() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    stub.fail_next_commit("conflict");
    let mut tx = conn.begin(&token, TxOptions::default()).await?;
    assert!(tx.commit(&token).await.is_err());
    assert!(!tx.is_done());
    tx.rollback(&token).await?;
    assert!(tx.is_done());
    Ok(())
}

#[tokio::test]
async fn leaked_transaction_blocks_second_begin() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    let tx = conn.begin(&token, TxOptions::default()).await?;
    std::mem::forget(tx);
    assert_eq!(conn.state(), ConnectionState::TxOpen);

    let err = conn.begin(&token, TxOptions::default()).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::TransactionState(_)));
    let begins = stub
        .calls()
        .iter()
        .filter(|c| matches!(c, RecordedCall::Begin(_)))
        .count();
    assert_eq!(begins, 1);
    Ok(())
}

#[tokio::test]
async fn dropped_transaction_is_rolled_back() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    {
        let _tx = conn.begin(&token, TxOptions::default()).await?;
    }
    assert_eq!(conn.state(), ConnectionState::Ready);

    // the rollback runs on a spawned task
    for _ in 0..100 {
        if stub.rollbacks() == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(stub.rollbacks(), 1);
    Ok(())
}

#[tokio::test]
async fn begin_failure_leaves_connection_ready() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    stub.fail_next_begin("cluster paused");
    let err = conn.begin(&token, TxOptions::default()).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::RemoteCall(_)));
    assert_eq!(conn.state(), ConnectionState::Ready);
    assert_eq!(stub.rollbacks(), 0);
    Ok(())
}

#[tokio::test]
async fn tx_statement_rejected_after_commit() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    let mut tx = conn.begin(&token, TxOptions::default()).await?;
    let stmt = tx.prepare("DELETE FROM t")?;
    tx.commit(&token).await?;

    let err = stmt.exec(&token, &[]).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::TransactionState(_)));
    let err = stmt.query(&token, &[]).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::TransactionState(_)));
    assert!(stub.statements().is_empty());
    Ok(())
}

#[tokio::test]
async fn tx_statement_rejected_after_rollback_and_in_later_tx() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::postgres());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    let mut tx = conn.begin(&token, TxOptions::default()).await?;
    let stmt = tx.prepare("UPDATE t SET a = $1")?;
    tx.rollback(&token).await?;
    drop(tx);

    let args = NamedValue::ordinal_args(vec![RowValues::Int(1)]);
    let err = stmt.exec(&token, &args).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::TransactionState(_)));

    // a second transaction does not revive a statement bound to the first
    let mut second = conn.begin(&token, TxOptions::default()).await?;
    assert_eq!(second.id(), "tx-2");
    let err = stmt.query(&token, &args).await.unwrap_err();
    assert!(matches!(err, SqlDataApiError::TransactionState(_)));
    second.rollback(&token).await?;

    assert!(stub.statements().is_empty());
    assert_eq!(stub.rollbacks(), 2);
    Ok(())
}

#[tokio::test]
async fn connection_statement_joins_open_transaction() -> Result<(), SqlDataApiError> {
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = connect(&stub).await?;

    let stmt = conn.prepare("UPDATE t SET a = 1");
    assert_eq!(stmt.transaction_id(), None);

    let mut tx = conn.begin(&token, TxOptions::default()).await?;
    stmt.exec(&token, &[]).await?;
    tx.commit(&token).await?;
    drop(tx);
    stmt.exec(&token, &[]).await?;

    let sent: Vec<_> = stub
        .statements()
        .into_iter()
        .map(|s| (s.sql, s.transaction_id))
        .collect();
    assert_eq!(
        sent,
        vec![
            ("UPDATE t SET a = 1".to_string(), Some("tx-1".to_string())),
            ("UPDATE t SET a = 1".to_string(), None),
        ]
    );
    Ok(())
}

#[test]
fn dropped_outside_runtime_frees_connection() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let stub = Arc::new(StubExecutor::mysql());
    let token = CancellationToken::new();
    let mut conn = rt.block_on(connect(&stub)).unwrap();

    let tx = rt
        .block_on(conn.begin(&token, TxOptions::default()))
        .unwrap();
    // no runtime context here, so the rollback cannot be spawned
    drop(tx);

    assert_eq!(conn.state(), ConnectionState::Ready);
    assert_eq!(stub.rollbacks(), 0);
}
