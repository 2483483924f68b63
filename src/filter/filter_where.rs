use serde_json::Value;

use super::error::FilterError;
use super::types::{parse_decimal, FilterCriteria, FilterField, FilterOp, SqlFragment, SqlValue};
use crate::database::columns::quote_identifier;

/// A recognized criterion after coercion
#[derive(Debug, Clone)]
enum Operand {
    Bound(SqlValue),
    Flag(bool),
}

/// Builds a parameterized WHERE clause from a resource's recognized filter keys.
///
/// Conditions come out in the order their keys appear in the criteria and are
/// joined with `AND`. Keys the resource does not declare are skipped, as are
/// `null` values. Only column names and operators are written into the SQL;
/// every value goes into the parameter list, with one bind type per operator
/// (numeric for bounds, text for ILIKE) whatever JSON type supplied it.
pub struct FilterWhere {
    param_values: Vec<SqlValue>,
    conditions: Vec<String>,
}

impl FilterWhere {
    fn new() -> Self {
        Self {
            param_values: vec![],
            conditions: vec![],
        }
    }

    pub fn generate(fields: &[FilterField], criteria: &FilterCriteria) -> Result<SqlFragment, FilterError> {
        let recognized = Self::recognize(fields, criteria)?;
        Self::validate_ranges(&recognized)?;

        let mut filter_where = Self::new();
        for (field, operand) in recognized {
            filter_where.push_condition(field, operand);
        }

        let fragment = SqlFragment {
            clause: filter_where.conditions.join(" AND "),
            params: filter_where.param_values,
        };

        if crate::config::CONFIG.filter.debug_logging {
            tracing::debug!(clause = %fragment.clause, params = fragment.params.len(), "built filter");
        }

        Ok(fragment)
    }

    /// Pair each recognized key with its coerced value, keeping input order.
    fn recognize(fields: &[FilterField], criteria: &FilterCriteria) -> Result<Vec<(FilterField, Operand)>, FilterError> {
        let mut recognized = Vec::new();
        for (key, value) in criteria {
            let Some(field) = fields.iter().find(|f| f.key == key.as_str()) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            recognized.push((*field, Self::coerce(field, value)?));
        }
        Ok(recognized)
    }

    fn coerce(field: &FilterField, value: &Value) -> Result<Operand, FilterError> {
        let invalid = |reason: &str| FilterError::InvalidValue {
            key: field.key.to_string(),
            reason: reason.to_string(),
        };

        match field.op {
            FilterOp::Gte | FilterOp::Lte => parse_decimal(value)
                .map(|d| Operand::Bound(SqlValue::Numeric(Some(d))))
                .ok_or_else(|| invalid("expected a number")),
            FilterOp::ILike => match value {
                Value::String(s) => Ok(Operand::Bound(SqlValue::text(s.as_str()))),
                _ => Err(invalid("expected text")),
            },
            FilterOp::Positive => match value {
                Value::Bool(b) => Ok(Operand::Flag(*b)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(Operand::Flag(true)),
                    "false" => Ok(Operand::Flag(false)),
                    _ => Err(invalid("expected true or false")),
                },
                _ => Err(invalid("expected true or false")),
            },
        }
    }

    /// A lower bound may not exceed an upper bound on the same column.
    fn validate_ranges(recognized: &[(FilterField, Operand)]) -> Result<(), FilterError> {
        let bound = |op: FilterOp| {
            recognized.iter().filter_map(move |(f, operand)| match operand {
                Operand::Bound(SqlValue::Numeric(Some(d))) if f.op == op => Some((f.column, *d)),
                _ => None,
            })
        };

        for (column, min) in bound(FilterOp::Gte) {
            for (_, max) in bound(FilterOp::Lte).filter(|(c, _)| *c == column) {
                if min > max {
                    return Err(FilterError::InvalidRange {
                        column: column.to_string(),
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }

    fn push_condition(&mut self, field: FilterField, operand: Operand) {
        let column = quote_identifier(field.column);
        let condition = match (field.op, operand) {
            (FilterOp::Positive, Operand::Flag(true)) => format!("{} > 0", column),
            (FilterOp::Positive, _) | (_, Operand::Flag(_)) => return,
            (FilterOp::Gte, Operand::Bound(value)) => format!("{} >= {}", column, self.param(value)),
            (FilterOp::Lte, Operand::Bound(value)) => format!("{} <= {}", column, self.param(value)),
            (FilterOp::ILike, Operand::Bound(value)) => {
                format!("{} ILIKE '%' || {} || '%'", column, self.param(value))
            }
        };
        self.conditions.push(condition);
    }

    fn param(&mut self, value: SqlValue) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }
}
