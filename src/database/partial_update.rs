use serde_json::{Map, Value};
use thiserror::Error;

use super::columns::{is_valid_identifier, quote_identifier, ColumnMap};
use crate::filter::types::{SqlFragment, SqlValue};

#[derive(Debug, Error, PartialEq)]
pub enum UpdateError {
    #[error("No data to update")]
    EmptyUpdate,

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Builds the SET list of an `UPDATE` from a sparse field → value object.
///
/// Assignments follow the insertion order of `data` and use placeholders
/// `$1..$N`, so the N-th value in `params` belongs to the N-th assignment.
/// Each value is converted to its column's declared type before binding.
/// A caller adding its own key placeholder takes it from
/// [`SqlFragment::next_placeholder`].
pub struct PartialUpdate;

impl PartialUpdate {
    pub fn build(data: &Map<String, Value>, columns: &ColumnMap) -> Result<SqlFragment, UpdateError> {
        if data.is_empty() {
            return Err(UpdateError::EmptyUpdate);
        }

        let mut assignments = Vec::with_capacity(data.len());
        let mut params = Vec::with_capacity(data.len());

        for (field, value) in data {
            let column = columns.map(field);
            if !is_valid_identifier(column) {
                return Err(UpdateError::InvalidColumn(column.to_string()));
            }
            let value = SqlValue::from_json(columns.sql_type(field), value).map_err(|reason| {
                UpdateError::InvalidValue {
                    field: field.clone(),
                    reason: reason.to_string(),
                }
            })?;
            params.push(value);
            assignments.push(format!("{} = ${}", quote_identifier(column), params.len()));
        }

        Ok(SqlFragment {
            clause: assignments.join(", "),
            params,
        })
    }
}
