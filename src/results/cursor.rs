use std::collections::VecDeque;
use std::sync::Arc;

use super::ResultSet;
use crate::dialect::{Dialect, FieldConverter};
use crate::error::SqlDataApiError;
use crate::types::RowValues;
use crate::wire::{ExecuteStatementResponse, Field};

/// Column shape and decoders of the result set being read.
#[derive(Debug)]
struct CurrentSet {
    columns: Arc<Vec<String>>,
    column_types: Vec<String>,
    converters: Vec<FieldConverter>,
    records: std::vec::IntoIter<Vec<Field>>,
}

impl CurrentSet {
    fn enter(dialect: &Dialect, response: ExecuteStatementResponse) -> Self {
        let mut columns = Vec::with_capacity(response.column_metadata.len());
        let mut column_types = Vec::with_capacity(response.column_metadata.len());
        let mut converters = Vec::with_capacity(response.column_metadata.len());
        for meta in response.column_metadata {
            converters.push(dialect.field_converter(&meta.type_name));
            columns.push(meta.name);
            column_types.push(meta.type_name);
        }
        Self {
            columns: Arc::new(columns),
            column_types,
            converters,
            records: response.records.into_iter(),
        }
    }
}

/// Forward-only reader over the result sets of one query.
///
/// Rows are decoded on demand. Reaching the end of a set (`next_row` returning `None`) is
/// separate from running out of sets (`next_result_set` returning `false`).
#[derive(Debug)]
pub struct ResultCursor {
    dialect: Dialect,
    current: Option<CurrentSet>,
    pending: VecDeque<ExecuteStatementResponse>,
}

impl ResultCursor {
    pub(crate) fn new(dialect: Dialect, responses: Vec<ExecuteStatementResponse>) -> Self {
        let mut pending: VecDeque<_> = responses.into();
        let current = pending
            .pop_front()
            .map(|first| CurrentSet::enter(&dialect, first));
        Self {
            dialect,
            current,
            pending,
        }
    }

    /// Column names of the current result set.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        self.current
            .as_ref()
            .map(|c| c.columns.as_slice())
            .unwrap_or_default()
    }

    /// Remote type names of the current result set's columns.
    #[must_use]
    pub fn column_types(&self) -> &[String] {
        self.current
            .as_ref()
            .map(|c| c.column_types.as_slice())
            .unwrap_or_default()
    }

    /// Decode the next row of the current result set, or `None` at its end.
    ///
    /// # Errors
    /// `ProtocolDecode` when a field does not fit its column type.
    pub fn next_row(&mut self) -> Result<Option<Vec<RowValues>>, SqlDataApiError> {
        let Some(current) = self.current.as_mut() else {
            return Ok(None);
        };
        let Some(record) = current.records.next() else {
            return Ok(None);
        };

        record
            .iter()
            .enumerate()
            .map(|(i, field)| match current.converters.get(i) {
                Some(conv) => conv.convert(field),
                // records wider than their metadata fall back to the wire tag
                None => self.dialect.field_converter("").convert(field),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    #[must_use]
    pub fn has_next_result_set(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Move to the next result set, dropping unread rows of the current one. Returns `false`
    /// once there are no more sets.
    pub fn next_result_set(&mut self) -> bool {
        match self.pending.pop_front() {
            Some(next) => {
                self.current = Some(CurrentSet::enter(&self.dialect, next));
                true
            }
            None => false,
        }
    }

    /// Drain the remaining rows of this and every later set into materialised result sets.
    ///
    /// # Errors
    /// The first decode error met.
    pub fn into_result_sets(mut self) -> Result<Vec<ResultSet>, SqlDataApiError> {
        let mut sets = Vec::with_capacity(self.pending.len() + 1);
        if self.current.is_none() {
            return Ok(sets);
        }

        loop {
            let mut set = ResultSet::with_capacity(
                self.current.as_ref().map_or(0, |c| c.records.len()),
            );
            if let Some(current) = &self.current {
                set.set_column_names(Arc::clone(&current.columns));
                set.set_column_types(current.column_types.clone());
            }
            while let Some(row) = self.next_row()? {
                set.add_row_values(row);
            }
            sets.push(set);

            if !self.next_result_set() {
                return Ok(sets);
            }
        }
    }
}
