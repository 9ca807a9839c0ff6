//! Test doubles for code built on this crate. Enabled by the `test-utils` feature.

mod stub;
pub mod test_helpers;

pub use stub::{RecordedCall, StubExecutor};
pub use test_helpers::{create_test_row, exec_response, rows_response};
