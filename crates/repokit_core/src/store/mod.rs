//! Persistence store contract consumed by repositories.
//!
//! # Responsibility
//! - Define the single-statement operations a repository may issue.
//! - Report writes as affected-row counts so callers derive outcomes.
//!
//! # Invariants
//! - Each write method issues exactly one statement; its count is final.
//! - `query` returns rows in store-native order (`rowid` order for SQLite).
//! - Stores never interpret a `Filter` beyond rendering it for the backend.

use crate::db::DbError;
use crate::model::entity::Entity;
use crate::model::key::Key;
use crate::query::filter::Filter;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    UnknownColumn {
        table: &'static str,
        column: String,
    },
    InvalidIdentifier(String),
    InvalidFilter(String),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownColumn { table, column } => {
                write!(f, "unknown column `{column}` for table `{table}`")
            }
            Self::InvalidIdentifier(name) => write!(f, "invalid SQL identifier `{name}`"),
            Self::InvalidFilter(message) => write!(f, "invalid filter: {message}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UnknownColumn { .. } => None,
            Self::InvalidIdentifier(_) => None,
            Self::InvalidFilter(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Offset/limit window applied after filtering and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub offset: u64,
    /// `None` reads to the end of the result set.
    pub limit: Option<u64>,
}

impl Window {
    /// Whole result set.
    pub const fn unbounded() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }

    /// Window of a 1-based page. Page `0` is treated as page `1`.
    pub fn page(page_number: u32, page_size: u32) -> Self {
        let index = u64::from(page_number.max(1) - 1);
        let size = u64::from(page_size);
        Self {
            offset: index.saturating_mul(size),
            limit: Some(size),
        }
    }

    pub const fn first(limit: u64) -> Self {
        Self {
            offset: 0,
            limit: Some(limit),
        }
    }
}

/// Store operations used by `EntityRepository`.
///
/// Write methods return the number of affected rows of their one statement.
pub trait Store {
    /// Adds `entity` as a new row.
    fn insert<E: Entity>(&self, entity: &E) -> StoreResult<usize>;

    /// Replaces the row carrying `entity`'s key. Affects zero rows when no
    /// such row exists; never inserts.
    fn replace_existing<E: Entity>(&self, entity: &E) -> StoreResult<usize>;

    /// Removes the row carrying `key`.
    fn remove<E: Entity>(&self, key: &Key) -> StoreResult<usize>;

    fn find_by_key<E: Entity>(&self, key: &Key) -> StoreResult<Option<E>>;

    /// Matching rows in store order, restricted to `window`.
    fn query<E: Entity>(&self, filter: &Filter, window: Window) -> StoreResult<Vec<E>>;

    fn count<E: Entity>(&self, filter: &Filter) -> StoreResult<u64>;
}

impl<S: Store> Store for &S {
    fn insert<E: Entity>(&self, entity: &E) -> StoreResult<usize> {
        (**self).insert(entity)
    }

    fn replace_existing<E: Entity>(&self, entity: &E) -> StoreResult<usize> {
        (**self).replace_existing(entity)
    }

    fn remove<E: Entity>(&self, key: &Key) -> StoreResult<usize> {
        (**self).remove::<E>(key)
    }

    fn find_by_key<E: Entity>(&self, key: &Key) -> StoreResult<Option<E>> {
        (**self).find_by_key(key)
    }

    fn query<E: Entity>(&self, filter: &Filter, window: Window) -> StoreResult<Vec<E>> {
        (**self).query(filter, window)
    }

    fn count<E: Entity>(&self, filter: &Filter) -> StoreResult<u64> {
        (**self).count::<E>(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::Window;

    #[test]
    fn page_window_is_one_based() {
        assert_eq!(
            Window::page(2, 3),
            Window {
                offset: 3,
                limit: Some(3)
            }
        );
        assert_eq!(Window::page(1, 10).offset, 0);
    }

    #[test]
    fn page_zero_is_clamped_to_first_page() {
        assert_eq!(Window::page(0, 5), Window::page(1, 5));
    }

    #[test]
    fn large_pages_do_not_overflow() {
        let window = Window::page(u32::MAX, u32::MAX);
        assert_eq!(
            window.offset,
            u64::from(u32::MAX - 1) * u64::from(u32::MAX)
        );
    }
}
