//! Convenient imports for common functionality.

pub use crate::config::Config;
pub use crate::connection::{Connection, ConnectionState};
pub use crate::connector::Connector;
pub use crate::dialect::{Dialect, TimeSettings};
pub use crate::driver::{Driver, DriverRegistry};
pub use crate::error::SqlDataApiError;
pub use crate::executor::{Executor, SharedExecutor};
pub use crate::results::{CustomDbRow, ExecResult, ResultCursor, ResultSet};
pub use crate::retry::RetryPolicy;
pub use crate::statement::Statement;
pub use crate::transaction::Transaction;
pub use crate::translation::{PlaceholderStyle, rewrite_placeholders};
pub use crate::types::{DialectKind, IsolationLevel, NamedValue, RowValues, TxOptions};

pub use tokio_util::sync::CancellationToken;
