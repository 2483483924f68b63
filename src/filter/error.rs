use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid range on {column}: minimum {min} is greater than maximum {max}")]
    InvalidRange { column: String, min: Decimal, max: Decimal },

    #[error("Invalid value for filter '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
