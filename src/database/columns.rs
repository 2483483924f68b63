use crate::filter::types::SqlType;

/// One domain field and the column that stores it
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub field: &'static str,
    pub name: &'static str,
    pub sql_type: SqlType,
}

impl Column {
    pub const fn text(field: &'static str, name: &'static str) -> Self {
        Self { field, name, sql_type: SqlType::Text }
    }

    pub const fn int(field: &'static str, name: &'static str) -> Self {
        Self { field, name, sql_type: SqlType::Int }
    }

    pub const fn numeric(field: &'static str, name: &'static str) -> Self {
        Self { field, name, sql_type: SqlType::Numeric }
    }
}

/// Static domain-field → storage-column lookup for one table.
///
/// Fields without an entry map to themselves as text columns, since most
/// API names already match their column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    entries: &'static [Column],
}

impl ColumnMap {
    pub const fn new(entries: &'static [Column]) -> Self {
        Self { entries }
    }

    /// Map with no entries; every field is its own text column.
    pub const fn identity() -> Self {
        Self { entries: &[] }
    }

    fn entry(&self, field: &str) -> Option<&Column> {
        self.entries.iter().find(|c| c.field == field)
    }

    pub fn map<'a>(&self, field: &'a str) -> &'a str {
        self.entry(field).map(|c| c.name).unwrap_or(field)
    }

    pub fn sql_type(&self, field: &str) -> SqlType {
        self.entry(field).map(|c| c.sql_type).unwrap_or(SqlType::Text)
    }
}

/// Whether `name` can be written into SQL as a column identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote SQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
