pub mod columns;
pub mod manager;
pub mod models;
pub mod partial_update;
pub mod query_builder;

pub use columns::{Column, ColumnMap};
pub use manager::{DatabaseError, DatabaseManager};
pub use partial_update::{PartialUpdate, UpdateError};
