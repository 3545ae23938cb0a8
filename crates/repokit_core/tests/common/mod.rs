#![allow(dead_code)]

use repokit_core::db::open_db_in_memory;
use repokit_core::{Column, ColumnType, Entity, SqliteStore};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

/// Integer-keyed test entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Foo {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub birth_date: Option<String>,
}

impl Foo {
    pub fn new(id: i64, name: &str, age: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
            birth_date: None,
        }
    }
}

impl Entity for Foo {
    type Key = i64;

    const TABLE: &'static str = "foos";
    const COLUMNS: &'static [Column] = &[
        Column::new("name", ColumnType::Text),
        Column::new("age", ColumnType::Integer),
        Column::new("birth_date", ColumnType::Text).nullable(),
    ];

    fn key(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(self.age),
            self.birth_date.clone().map_or(Value::Null, Value::Text),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            age: row.get("age")?,
            birth_date: row.get("birth_date")?,
        })
    }
}

/// Text-keyed test entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub code: String,
    pub label: String,
}

impl Bar {
    pub fn new(code: &str, label: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
        }
    }
}

impl Entity for Bar {
    type Key = String;

    const TABLE: &'static str = "bars";
    const KEY_COLUMN: &'static str = "code";
    const COLUMNS: &'static [Column] = &[Column::new("label", ColumnType::Text)];

    fn key(&self) -> String {
        self.code.clone()
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.label.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get("code")?,
            label: row.get("label")?,
        })
    }
}

/// In-memory connection with `foos` and `bars` tables.
pub fn open_ready_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    store.ensure_table::<Foo>().unwrap();
    store.ensure_table::<Bar>().unwrap();
    conn
}

/// Foos with ids `1..=count`, ages `20 + id`.
pub fn foos(count: i64) -> Vec<Foo> {
    (1..=count)
        .map(|id| Foo::new(id, &format!("foo-{id}"), 20 + id))
        .collect()
}
