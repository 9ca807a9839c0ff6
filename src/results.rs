//! Outcomes of statement execution.

mod cursor;
mod result_set;
mod row;

pub use cursor::ResultCursor;
pub use result_set::ResultSet;
pub use row::CustomDbRow;

use crate::wire::{ExecuteStatementResponse, Field};

/// Outcome of an exec call across every text of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Sum of the rows updated by each text
    pub rows_affected: i64,
    /// Generated id of the last text that returned exactly one numeric generated field, else 0
    pub last_insert_id: i64,
}

impl ExecResult {
    #[must_use]
    pub fn from_responses(responses: &[ExecuteStatementResponse]) -> Self {
        responses
            .iter()
            .fold(ExecResult::default(), |mut acc, resp| {
                acc.rows_affected += resp.number_of_records_updated;
                if let [Field::LongValue(id)] = resp.generated_fields.as_slice() {
                    acc.last_insert_id = *id;
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(updated: i64, generated: Vec<Field>) -> ExecuteStatementResponse {
        ExecuteStatementResponse {
            number_of_records_updated: updated,
            generated_fields: generated,
            ..ExecuteStatementResponse::default()
        }
    }

    #[test]
    fn sums_rows_and_keeps_last_single_id() {
        let r = ExecResult::from_responses(&[
            resp(2, vec![Field::LongValue(10)]),
            resp(3, vec![Field::LongValue(11)]),
        ]);
        assert_eq!(r.rows_affected, 5);
        assert_eq!(r.last_insert_id, 11);
    }

    #[test]
    fn ignores_ambiguous_or_non_numeric_ids() {
        let r = ExecResult::from_responses(&[
            resp(1, vec![Field::LongValue(10)]),
            resp(1, vec![Field::LongValue(20), Field::LongValue(21)]),
            resp(1, vec![Field::StringValue("abc".into())]),
        ]);
        assert_eq!(r.rows_affected, 3);
        assert_eq!(r.last_insert_id, 10);

        assert_eq!(ExecResult::from_responses(&[]), ExecResult::default());
    }
}
