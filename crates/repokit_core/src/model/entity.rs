//! Table mapping for persisted record types.

use super::key::EntityKey;
use rusqlite::types::Value;
use rusqlite::Row;

/// SQLite storage class of a non-key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnType {
    pub(crate) fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }
}

/// Declaration of one non-key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

/// A record type persisted as one row of `TABLE`.
///
/// # Contract
/// - `key()` is stable for the record lifetime and unique within `TABLE`.
/// - `values()` returns one value per entry of `COLUMNS`, in the same order.
/// - `from_row()` reads the key column and every entry of `COLUMNS` by name.
pub trait Entity: Sized {
    type Key: EntityKey;

    const TABLE: &'static str;
    const KEY_COLUMN: &'static str = "id";
    const COLUMNS: &'static [Column];

    fn key(&self) -> Self::Key;

    fn values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Whether `name` is the key column or a declared column.
    fn has_column(name: &str) -> bool {
        name == Self::KEY_COLUMN || Self::COLUMNS.iter().any(|column| column.name == name)
    }
}
