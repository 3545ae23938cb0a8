//! Entity keys and key-kind dispatch.
//!
//! # Invariants
//! - `Key` is a closed union; a key of another runtime type can only be
//!   rejected at the boundary (`Key::from_dynamic`).
//! - A key is bound as SQL `INTEGER` or `TEXT`, matching its kind.

use crate::repo::{RepoError, RepoResult};
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use std::any::{type_name, Any};
use std::fmt::{Display, Formatter};

/// Storage kind of an entity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Integer,
    Text,
}

impl KeyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Text => "text",
        }
    }

    pub(crate) fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
        }
    }
}

impl Display for KeyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key accepted by repository read operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl Key {
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Int(_) => KeyKind::Integer,
            Self::Text(_) => KeyKind::Text,
        }
    }

    /// Converts a dynamically typed value into a key.
    ///
    /// Accepts `i64`, `i32`, `u32`, `String`, `&'static str` and `Key`.
    ///
    /// # Errors
    /// Returns `RepoError::InvalidKeyType` for any other runtime type.
    pub fn from_dynamic<T: Any>(value: &T) -> RepoResult<Self> {
        let value = value as &dyn Any;

        if let Some(id) = value.downcast_ref::<i64>() {
            return Ok(Self::Int(*id));
        }
        if let Some(id) = value.downcast_ref::<i32>() {
            return Ok(Self::Int(i64::from(*id)));
        }
        if let Some(id) = value.downcast_ref::<u32>() {
            return Ok(Self::Int(i64::from(*id)));
        }
        if let Some(id) = value.downcast_ref::<String>() {
            return Ok(Self::Text(id.clone()));
        }
        if let Some(id) = value.downcast_ref::<&'static str>() {
            return Ok(Self::Text((*id).to_string()));
        }
        if let Some(key) = value.downcast_ref::<Key>() {
            return Ok(key.clone());
        }

        Err(RepoError::InvalidKeyType {
            expected: "integer|text",
            found: type_name::<T>().to_string(),
        })
    }

    /// Checks that this key can address an entity keyed by `expected`.
    pub(crate) fn ensure_kind(&self, expected: KeyKind) -> RepoResult<()> {
        if self.kind() == expected {
            return Ok(());
        }
        Err(RepoError::InvalidKeyType {
            expected: expected.as_str(),
            found: self.kind().as_str().to_string(),
        })
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl ToSql for Key {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Int(id) => ToSqlOutput::Owned(Value::Integer(*id)),
            Self::Text(id) => ToSqlOutput::Borrowed(ValueRef::Text(id.as_bytes())),
        })
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Key type an entity is fixed to.
pub trait EntityKey: Clone {
    const KIND: KeyKind;

    fn to_key(&self) -> Key;
}

impl EntityKey for i64 {
    const KIND: KeyKind = KeyKind::Integer;

    fn to_key(&self) -> Key {
        Key::Int(*self)
    }
}

impl EntityKey for i32 {
    const KIND: KeyKind = KeyKind::Integer;

    fn to_key(&self) -> Key {
        Key::Int(i64::from(*self))
    }
}

impl EntityKey for String {
    const KIND: KeyKind = KeyKind::Text;

    fn to_key(&self) -> Key {
        Key::Text(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, KeyKind};
    use crate::repo::RepoError;
    use std::time::{Duration, SystemTime};

    #[test]
    fn supported_runtime_types_become_keys() {
        assert_eq!(Key::from_dynamic(&7_i64).unwrap(), Key::Int(7));
        assert_eq!(Key::from_dynamic(&7_i32).unwrap(), Key::Int(7));
        assert_eq!(Key::from_dynamic(&7_u32).unwrap(), Key::Int(7));
        assert_eq!(
            Key::from_dynamic(&"abc".to_string()).unwrap(),
            Key::Text("abc".to_string())
        );
        assert_eq!(
            Key::from_dynamic(&"abc").unwrap(),
            Key::Text("abc".to_string())
        );
    }

    #[test]
    fn unsupported_runtime_types_are_rejected() {
        let rejected = [
            Key::from_dynamic(&1.5_f64).unwrap_err(),
            Key::from_dynamic(&()).unwrap_err(),
            Key::from_dynamic(&SystemTime::UNIX_EPOCH).unwrap_err(),
            Key::from_dynamic(&Duration::from_secs(1)).unwrap_err(),
            Key::from_dynamic(&7_u64).unwrap_err(),
        ];

        for err in rejected {
            assert!(matches!(err, RepoError::InvalidKeyType { .. }), "{err}");
        }
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let err = Key::Text("1".to_string())
            .ensure_kind(KeyKind::Integer)
            .unwrap_err();
        match err {
            RepoError::InvalidKeyType { expected, found } => {
                assert_eq!(expected, "integer");
                assert_eq!(found, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
