use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filter input: key → value, iterated in insertion order.
pub type FilterCriteria = Map<String, Value>;

/// Comparison a recognized filter key turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Inclusive lower bound: `column >= $n`
    Gte,
    /// Inclusive upper bound: `column <= $n`
    Lte,
    /// Case-insensitive containment: `column ILIKE '%' || $n || '%'`
    ILike,
    /// Boolean switch: `column > 0` when true, nothing when false
    Positive,
}

/// One recognized filter key of a resource
#[derive(Debug, Clone, Copy)]
pub struct FilterField {
    pub key: &'static str,
    pub column: &'static str,
    pub op: FilterOp,
}

impl FilterField {
    pub const fn new(key: &'static str, column: &'static str, op: FilterOp) -> Self {
        Self { key, column, op }
    }
}

/// Postgres type a parameter is bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Int,
    Numeric,
}

/// A parameter value with a fixed bind type.
///
/// Prepared statements are cached per connection by SQL text, so a given
/// placeholder must always be bound with the same type. The type comes from
/// the target column, never from the JSON value that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Int(Option<i32>),
    Numeric(Option<Decimal>),
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(Some(value.into()))
    }

    pub fn null(sql_type: SqlType) -> Self {
        match sql_type {
            SqlType::Text => SqlValue::Text(None),
            SqlType::Int => SqlValue::Int(None),
            SqlType::Numeric => SqlValue::Numeric(None),
        }
    }

    /// Convert a JSON body value for a column of `sql_type`.
    ///
    /// Text takes strings only and Int takes whole JSON numbers in i32 range.
    /// Numeric also accepts numeric strings. `null` becomes a typed NULL.
    pub fn from_json(sql_type: SqlType, value: &Value) -> Result<Self, &'static str> {
        if value.is_null() {
            return Ok(Self::null(sql_type));
        }
        match sql_type {
            SqlType::Text => match value {
                Value::String(s) => Ok(SqlValue::text(s.as_str())),
                _ => Err("expected text"),
            },
            SqlType::Int => value
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(|i| SqlValue::Int(Some(i)))
                .ok_or("expected an integer"),
            SqlType::Numeric => parse_decimal(value)
                .map(|d| SqlValue::Numeric(Some(d)))
                .ok_or("expected a number"),
        }
    }
}

/// A JSON number or numeric string as an exact decimal.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// SQL text plus the values for its `$1..$N` placeholders, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub clause: String,
    pub params: Vec<SqlValue>,
}

impl SqlFragment {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// Placeholder for a value the caller appends after this fragment's own.
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.params.len() + 1)
    }

    /// ` WHERE <clause>`, or nothing when there are no conditions.
    pub fn where_sql(&self) -> String {
        if self.clause.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clause)
        }
    }
}
