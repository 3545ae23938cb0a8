//! SQLite implementation of the store contract.
//!
//! # Responsibility
//! - Build parameterized statements from `Entity` table mappings.
//! - Render `Filter` expressions into `WHERE` clauses.
//!
//! # Invariants
//! - Identifiers are validated and quoted; values are always bound.
//! - Reads are ordered by `rowid`: key order for `INTEGER` keys, which alias
//!   `rowid`, and insertion order for `TEXT` keys.
//! - Statements run in autocommit mode, one statement per write.

use super::{Store, StoreError, StoreResult, Window};
use crate::model::entity::Entity;
use crate::model::key::{EntityKey, Key};
use crate::query::filter::{Filter, FilterCondition, FilterOperator, FilterValue};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Store over one borrowed SQLite connection.
#[derive(Clone, Copy)]
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// Creates `E::TABLE` from its column declarations when missing.
    ///
    /// Existing tables are left untouched; column drift is not detected.
    pub fn ensure_table<E: Entity>(&self) -> StoreResult<()> {
        let mapping = TableMapping::of::<E>()?;
        let mut definitions = vec![format!(
            "{} {} PRIMARY KEY NOT NULL",
            mapping.key,
            <E::Key as EntityKey>::KIND.sql_type()
        )];
        for (name, column) in mapping.columns.iter().zip(E::COLUMNS) {
            let null_clause = if column.nullable { "" } else { " NOT NULL" };
            definitions.push(format!("{name} {}{null_clause}", column.kind.sql_type()));
        }

        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
            mapping.table,
            definitions.join(",\n    ")
        ))?;
        debug!("event=ensure_table module=store table={} status=ok", E::TABLE);
        Ok(())
    }
}

impl Store for SqliteStore<'_> {
    fn insert<E: Entity>(&self, entity: &E) -> StoreResult<usize> {
        let mapping = TableMapping::of::<E>()?;
        let mut names = vec![mapping.key.as_str()];
        names.extend(mapping.columns.iter().map(String::as_str));
        let placeholders = (1..=names.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut binds = vec![key_value(entity.key().to_key())];
        binds.extend(entity_values(entity)?);

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            mapping.table,
            names.join(", ")
        );
        Ok(self.conn.execute(&sql, params_from_iter(binds))?)
    }

    fn replace_existing<E: Entity>(&self, entity: &E) -> StoreResult<usize> {
        let mapping = TableMapping::of::<E>()?;
        let assignments = if mapping.columns.is_empty() {
            format!("{0} = {0}", mapping.key)
        } else {
            mapping
                .columns
                .iter()
                .enumerate()
                .map(|(index, name)| format!("{name} = ?{}", index + 1))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut binds = entity_values(entity)?;
        binds.push(key_value(entity.key().to_key()));

        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {} = ?{};",
            mapping.table,
            mapping.key,
            binds.len()
        );
        Ok(self.conn.execute(&sql, params_from_iter(binds))?)
    }

    fn remove<E: Entity>(&self, key: &Key) -> StoreResult<usize> {
        let mapping = TableMapping::of::<E>()?;
        let sql = format!("DELETE FROM {} WHERE {} = ?1;", mapping.table, mapping.key);
        Ok(self.conn.execute(&sql, [key])?)
    }

    fn find_by_key<E: Entity>(&self, key: &Key) -> StoreResult<Option<E>> {
        let mapping = TableMapping::of::<E>()?;
        let sql = format!("{} WHERE {} = ?1;", mapping.select_sql(), mapping.key);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(E::from_row(row)?));
        }

        Ok(None)
    }

    fn query<E: Entity>(&self, filter: &Filter, window: Window) -> StoreResult<Vec<E>> {
        let mapping = TableMapping::of::<E>()?;
        let mut binds = Vec::new();
        let mut sql = format!("{} WHERE ", mapping.select_sql());
        render_filter::<E>(filter, &mut sql, &mut binds)?;
        sql.push_str(" ORDER BY rowid ASC");

        if let Some(limit) = window.limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            binds.push(Value::Integer(clamp_to_i64(limit)));
            binds.push(Value::Integer(clamp_to_i64(window.offset)));
        } else if window.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            binds.push(Value::Integer(clamp_to_i64(window.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }

        Ok(entities)
    }

    fn count<E: Entity>(&self, filter: &Filter) -> StoreResult<u64> {
        let mapping = TableMapping::of::<E>()?;
        let mut binds = Vec::new();
        let mut sql = format!("SELECT COUNT(*) FROM {} WHERE ", mapping.table);
        render_filter::<E>(filter, &mut sql, &mut binds)?;

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count `{count}`")))
    }
}

/// Quoted identifiers of one entity table.
struct TableMapping {
    table: String,
    key: String,
    columns: Vec<String>,
}

impl TableMapping {
    fn of<E: Entity>() -> StoreResult<Self> {
        Ok(Self {
            table: quote_identifier(E::TABLE)?,
            key: quote_identifier(E::KEY_COLUMN)?,
            columns: E::COLUMNS
                .iter()
                .map(|column| quote_identifier(column.name))
                .collect::<StoreResult<_>>()?,
        })
    }

    fn select_sql(&self) -> String {
        let mut names = vec![self.key.as_str()];
        names.extend(self.columns.iter().map(String::as_str));
        format!("SELECT {} FROM {}", names.join(", "), self.table)
    }
}

fn quote_identifier(name: &str) -> StoreResult<String> {
    if !IDENTIFIER_RE.is_match(name) {
        return Err(StoreError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{name}\""))
}

fn key_value(key: Key) -> Value {
    match key {
        Key::Int(id) => Value::Integer(id),
        Key::Text(id) => Value::Text(id),
    }
}

fn entity_values<E: Entity>(entity: &E) -> StoreResult<Vec<Value>> {
    let values = entity.values();
    if values.len() != E::COLUMNS.len() {
        return Err(StoreError::InvalidData(format!(
            "`{}` produced {} values for {} columns",
            E::TABLE,
            values.len(),
            E::COLUMNS.len()
        )));
    }
    Ok(values)
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn render_filter<E: Entity>(
    filter: &Filter,
    sql: &mut String,
    binds: &mut Vec<Value>,
) -> StoreResult<()> {
    match filter {
        Filter::All => sql.push_str("1 = 1"),
        Filter::Condition(condition) => render_condition::<E>(condition, sql, binds)?,
        Filter::And(parts) => render_group::<E>(parts, " AND ", "1 = 1", sql, binds)?,
        Filter::Or(parts) => render_group::<E>(parts, " OR ", "0 = 1", sql, binds)?,
        Filter::Not(inner) => {
            sql.push_str("NOT (");
            render_filter::<E>(inner, sql, binds)?;
            sql.push(')');
        }
    }
    Ok(())
}

fn render_group<E: Entity>(
    parts: &[Filter],
    separator: &str,
    when_empty: &str,
    sql: &mut String,
    binds: &mut Vec<Value>,
) -> StoreResult<()> {
    if parts.is_empty() {
        sql.push_str(when_empty);
        return Ok(());
    }

    sql.push('(');
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            sql.push_str(separator);
        }
        render_filter::<E>(part, sql, binds)?;
    }
    sql.push(')');
    Ok(())
}

fn render_condition<E: Entity>(
    condition: &FilterCondition,
    sql: &mut String,
    binds: &mut Vec<Value>,
) -> StoreResult<()> {
    if !E::has_column(&condition.column) {
        return Err(StoreError::UnknownColumn {
            table: E::TABLE,
            column: condition.column.clone(),
        });
    }
    let column = quote_identifier(&condition.column)?;

    match condition.operator {
        FilterOperator::IsNull | FilterOperator::IsNotNull => {
            sql.push_str(&format!("{column} {}", condition.operator.as_sql()));
        }
        FilterOperator::In => {
            let FilterValue::List(items) = &condition.value else {
                return Err(StoreError::InvalidFilter(format!(
                    "`IN` on `{}` requires a list operand",
                    condition.column
                )));
            };
            if items.is_empty() {
                sql.push_str("0 = 1");
                return Ok(());
            }
            for item in items {
                binds.push(scalar_value(item, &condition.column)?);
            }
            let placeholders = vec!["?"; items.len()].join(", ");
            sql.push_str(&format!("{column} IN ({placeholders})"));
        }
        FilterOperator::Equal if condition.value == FilterValue::Null => {
            sql.push_str(&format!("{column} IS NULL"));
        }
        FilterOperator::NotEqual if condition.value == FilterValue::Null => {
            sql.push_str(&format!("{column} IS NOT NULL"));
        }
        operator if condition.value == FilterValue::Null => {
            return Err(StoreError::InvalidFilter(format!(
                "`{operator}` on `{}` cannot compare against NULL",
                condition.column
            )));
        }
        operator => {
            binds.push(scalar_value(&condition.value, &condition.column)?);
            sql.push_str(&format!("{column} {} ?", operator.as_sql()));
        }
    }
    Ok(())
}

fn scalar_value(value: &FilterValue, column: &str) -> StoreResult<Value> {
    Ok(match value {
        FilterValue::Integer(number) => Value::Integer(*number),
        FilterValue::Real(number) => Value::Real(*number),
        FilterValue::Text(text) => Value::Text(text.clone()),
        FilterValue::Boolean(flag) => Value::Integer(i64::from(*flag)),
        FilterValue::Null => Value::Null,
        FilterValue::List(_) => {
            return Err(StoreError::InvalidFilter(format!(
                "list operand on `{column}` is only valid with `IN`"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{quote_identifier, render_filter};
    use crate::model::entity::{Column, ColumnType, Entity};
    use crate::query::filter::Filter;
    use crate::store::StoreError;
    use rusqlite::types::Value;
    use rusqlite::Row;

    struct Sample;

    impl Entity for Sample {
        type Key = i64;

        const TABLE: &'static str = "samples";
        const COLUMNS: &'static [Column] = &[
            Column::new("name", ColumnType::Text),
            Column::new("age", ColumnType::Integer),
        ];

        fn key(&self) -> i64 {
            0
        }

        fn values(&self) -> Vec<Value> {
            Vec::new()
        }

        fn from_row(_row: &Row<'_>) -> rusqlite::Result<Self> {
            Ok(Self)
        }
    }

    fn render(filter: &Filter) -> Result<(String, Vec<Value>), StoreError> {
        let mut sql = String::new();
        let mut binds = Vec::new();
        render_filter::<Sample>(filter, &mut sql, &mut binds)?;
        Ok((sql, binds))
    }

    #[test]
    fn renders_nested_filters_with_positional_binds() {
        let filter =
            Filter::gt("age", 25).and(Filter::eq("name", "ada").or(Filter::is_null("name")));
        let (sql, binds) = render(&filter).unwrap();

        assert_eq!(sql, r#"("age" > ? AND ("name" = ? OR "name" IS NULL))"#);
        assert_eq!(binds, vec![Value::Integer(25), Value::Text("ada".to_string())]);
    }

    #[test]
    fn renders_in_lists_and_negation() {
        let (sql, binds) = render(&Filter::in_list("id", vec![1_i64, 2, 3]).negate()).unwrap();
        assert_eq!(sql, r#"NOT ("id" IN (?, ?, ?))"#);
        assert_eq!(binds.len(), 3);

        let (sql, binds) = render(&Filter::in_list("id", Vec::<i64>::new())).unwrap();
        assert_eq!(sql, "0 = 1");
        assert!(binds.is_empty());
    }

    #[test]
    fn rejects_undeclared_columns() {
        let err = render(&Filter::eq("age; DROP TABLE samples", 1)).unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { table: "samples", .. }));
    }

    #[test]
    fn null_equality_renders_as_null_test() {
        let (sql, binds) = render(&Filter::eq("name", None::<String>)).unwrap();
        assert_eq!(sql, r#""name" IS NULL"#);
        assert!(binds.is_empty());

        let (sql, binds) = render(&Filter::ne("name", None::<String>)).unwrap();
        assert_eq!(sql, r#""name" IS NOT NULL"#);
        assert!(binds.is_empty());

        let err = render(&Filter::gt("age", None::<i64>)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilter(_)));
    }

    #[test]
    fn rejects_list_operand_outside_in() {
        let err = render(&Filter::eq("age", vec![1_i64, 2])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilter(_)));
    }

    #[test]
    fn identifiers_are_validated_and_quoted() {
        assert_eq!(quote_identifier("birth_date").unwrap(), "\"birth_date\"");
        assert!(matches!(
            quote_identifier("1bad"),
            Err(StoreError::InvalidIdentifier(_))
        ));
        assert!(quote_identifier("name\"--").is_err());
    }
}
