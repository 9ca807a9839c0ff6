//! SQL client over a stateless statement-execution service.
//!
//! The service runs one statement per request and keeps no session, so this crate supplies
//! the parts a conventional client expects: placeholder rewriting and parameter encoding per
//! backend flavor (MySQL or PostgreSQL), result decoding that matches the native drivers,
//! remote transactions, and a cursor over multi-statement results. The transport is yours:
//! implement [`Executor`](executor::Executor) and hand it to a [`Connector`](connector::Connector).
//!
//! ```rust,no_run
//! use sql_dataapi::prelude::*;
//!
//! # async fn demo(executor: SharedExecutor) -> Result<(), SqlDataApiError> {
//! let token = CancellationToken::new();
//! let connector = Connector::new(Config::new("arn:cluster", "arn:secret", "app"), executor)?;
//! let mut conn = connector.connect(&token).await?;
//!
//! let mut tx = conn.begin(&token, TxOptions::default()).await?;
//! let res = tx
//!     .exec(
//!         &token,
//!         "INSERT INTO users (name) VALUES (?)",
//!         &NamedValue::ordinal_args(vec![RowValues::Text("alice".into())]),
//!     )
//!     .await?;
//! tx.commit(&token).await?;
//! drop(tx);
//!
//! let mut rows = conn
//!     .query(&token, "SELECT name FROM users WHERE id = ?", &NamedValue::ordinal_args(vec![RowValues::Int(res.last_insert_id)]))
//!     .await?;
//! while let Some(row) = rows.next_row()? {
//!     println!("{:?}", row[0].as_text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod connector;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod results;
pub mod retry;
pub mod statement;
pub mod transaction;
pub mod translation;
pub mod types;
pub mod wire;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::SqlDataApiError;
pub use types::{NamedValue, RowValues};
