use std::collections::HashMap;
use std::fmt;

use crate::config::Config;
use crate::connector::Connector;
use crate::error::SqlDataApiError;
use crate::executor::SharedExecutor;
use crate::retry::RetryPolicy;

/// An executor plus the defaults used for every connector opened through it.
#[derive(Clone)]
pub struct Driver {
    executor: SharedExecutor,
    retry_policy: RetryPolicy,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl Driver {
    #[must_use]
    pub fn new(executor: SharedExecutor) -> Self {
        Self {
            executor,
            retry_policy: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// # Errors
    /// Returns `SqlDataApiError::ConfigError` if the configuration is incomplete.
    pub fn open_connector(&self, config: Config) -> Result<Connector, SqlDataApiError> {
        Ok(Connector::new(config, self.executor.clone())?
            .with_retry_policy(self.retry_policy.clone()))
    }

    /// # Errors
    /// Returns `SqlDataApiError::ConfigError` if the DSN is malformed or incomplete.
    pub fn open_connector_dsn(&self, dsn: &str) -> Result<Connector, SqlDataApiError> {
        self.open_connector(Config::parse_dsn(dsn)?)
    }
}

/// Caller-owned set of named drivers. Nothing is registered implicitly.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Driver>,
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns `SqlDataApiError::ConfigError` if the name is empty or already taken.
    pub fn register(&mut self, name: impl Into<String>, driver: Driver) -> Result<(), SqlDataApiError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SqlDataApiError::ConfigError(
                "driver name must not be empty".to_string(),
            ));
        }
        if self.drivers.contains_key(&name) {
            return Err(SqlDataApiError::ConfigError(format!(
                "driver `{name}` is already registered"
            )));
        }
        self.drivers.insert(name, driver);
        Ok(())
    }

    /// Remove a driver, returning it if it was registered.
    pub fn deregister(&mut self, name: &str) -> Option<Driver> {
        self.drivers.remove(name)
    }

    #[must_use]
    pub fn driver(&self, name: &str) -> Option<&Driver> {
        self.drivers.get(name)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// # Errors
    /// Returns `SqlDataApiError::ConfigError` for an unknown driver name or a bad DSN.
    pub fn open_connector(&self, name: &str, dsn: &str) -> Result<Connector, SqlDataApiError> {
        self.driver(name)
            .ok_or_else(|| SqlDataApiError::ConfigError(format!("unknown driver `{name}`")))?
            .open_connector_dsn(dsn)
    }

    pub fn clear(&mut self) {
        self.drivers.clear();
    }
}
