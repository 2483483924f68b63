pub mod types;
pub mod filter_where;
pub mod query;
pub mod error;

pub use types::*;
pub use filter_where::FilterWhere;
pub use query::criteria_from_query;
pub use error::FilterError;
