use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::connection::Connection;
use crate::dialect::Dialect;
use crate::error::SqlDataApiError;
use crate::executor::{SharedExecutor, call_remote};
use crate::retry::RetryPolicy;
use crate::wire::{ExecuteStatementRequest, ExecuteStatementResponse, Field};

const VERSION_SQL: &str = "SELECT VERSION()";

/// Opens connections for one configuration.
///
/// ```rust,no_run
/// # use sql_dataapi::prelude::*;
/// # async fn demo(executor: SharedExecutor) -> Result<(), SqlDataApiError> {
/// let cfg = Config::new("arn:cluster", "arn:secret", "app");
/// let connector = Connector::new(cfg, executor)?;
/// let token = CancellationToken::new();
/// let conn = connector.connect(&token).await?;
/// conn.ping(&token).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Connector {
    config: Arc<Config>,
    executor: SharedExecutor,
    retry_policy: RetryPolicy,
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("config", &self.config)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl Connector {
    /// # Errors
    /// Returns `SqlDataApiError::ConfigError` if the configuration lacks a required field.
    pub fn new(config: Config, executor: SharedExecutor) -> Result<Self, SqlDataApiError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            executor,
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Replace the backoff used for the dialect probe.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Detect the backend family and return a connection bound to it.
    ///
    /// # Errors
    /// The probe's last error once retries are spent, `ProtocolDecode` for an unreadable
    /// version answer, or `Cancelled`.
    pub async fn connect(&self, cancel: &CancellationToken) -> Result<Connection, SqlDataApiError> {
        let dialect = self.detect_dialect(cancel).await?;
        Ok(Connection::new(
            Arc::clone(&self.config),
            Arc::clone(&self.executor),
            dialect,
        ))
    }

    async fn detect_dialect(&self, cancel: &CancellationToken) -> Result<Dialect, SqlDataApiError> {
        let request = ExecuteStatementRequest {
            resource_arn: self.config.resource_arn.clone(),
            secret_arn: self.config.secret_arn.clone(),
            database: self.config.database.clone(),
            transaction_id: None,
            sql: VERSION_SQL.to_string(),
            parameters: Vec::new(),
            include_result_metadata: false,
        };

        let executor = &self.executor;
        let request = &request;
        let version = self
            .retry_policy
            .run(cancel, "version probe", move || async move {
                let response =
                    call_remote(cancel, executor.execute_statement(request.clone())).await?;
                version_text(response)
            })
            .await?;

        let dialect = Dialect::from_version(&version, self.config.time_settings());
        info!(version = %version, dialect = ?dialect.kind(), "detected database engine");
        Ok(dialect)
    }
}

fn version_text(response: ExecuteStatementResponse) -> Result<String, SqlDataApiError> {
    let field = response
        .records
        .into_iter()
        .next()
        .and_then(|row| row.into_iter().next());
    match field {
        Some(Field::StringValue(version)) => Ok(version),
        Some(other) => Err(SqlDataApiError::decode("stringValue", other.tag())),
        None => Err(SqlDataApiError::decode(
            "one version row",
            "empty response",
        )),
    }
}
