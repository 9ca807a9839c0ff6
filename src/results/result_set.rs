use std::collections::HashMap;
use std::sync::Arc;

use super::row::{CustomDbRow, index_columns};
use crate::types::RowValues;

/// A fully materialised result set.
///
/// Produced by [`ResultCursor::into_result_sets`](super::ResultCursor::into_result_sets) for
/// callers who would rather index rows by column name than stream them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The decoded rows
    pub results: Vec<CustomDbRow>,
    /// Number of rows held in `results`
    pub rows_affected: usize,
    column_names: Option<Arc<Vec<String>>>,
    column_types: Vec<String>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            ..ResultSet::default()
        }
    }

    /// Set the column names shared by every row added afterwards.
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_index = Arc::new(index_columns(&column_names));
        self.column_names = Some(column_names);
    }

    pub fn set_column_types(&mut self, column_types: Vec<String>) {
        self.column_types = column_types;
    }

    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Remote type names, parallel to the column names.
    #[must_use]
    pub fn get_column_types(&self) -> &[String] {
        &self.column_types
    }

    /// Append a row of values. Ignored until column names are set.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        if let Some(column_names) = &self.column_names {
            self.results.push(CustomDbRow {
                column_names: Arc::clone(column_names),
                rows: row_values,
                column_index: Arc::clone(&self.column_index),
            });
            self.rows_affected += 1;
        }
    }
}
