//! Builders for canned service responses.

use std::sync::Arc;

use crate::results::CustomDbRow;
use crate::types::RowValues;
use crate::wire::{ColumnMetadata, ExecuteStatementResponse, Field};

/// Create a row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<RowValues>) -> CustomDbRow {
    CustomDbRow::new(Arc::new(column_names), values)
}

/// A response carrying rows, with `(name, type_name)` column metadata.
#[must_use]
pub fn rows_response(columns: &[(&str, &str)], records: Vec<Vec<Field>>) -> ExecuteStatementResponse {
    ExecuteStatementResponse {
        column_metadata: columns
            .iter()
            .map(|(name, type_name)| ColumnMetadata::new(*name, *type_name))
            .collect(),
        records,
        ..ExecuteStatementResponse::default()
    }
}

/// A response for a write that updated `updated` rows and generated `generated`.
#[must_use]
pub fn exec_response(updated: i64, generated: Vec<Field>) -> ExecuteStatementResponse {
    ExecuteStatementResponse {
        number_of_records_updated: updated,
        generated_fields: generated,
        ..ExecuteStatementResponse::default()
    }
}
