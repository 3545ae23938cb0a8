//! Generic repository over any `Store`.
//!
//! # Invariants
//! - Each mutating call issues exactly one store write.
//! - `update` is replace-if-present: a missing key affects zero rows and
//!   yields `Failed` without inserting.
//! - Page `0` is read as page `1`; a zero page size yields an empty page
//!   without a store round trip.

use super::error::RepoResult;
use super::outcome::OperationResult;
use crate::model::entity::Entity;
use crate::model::key::{EntityKey, Key};
use crate::query::filter::Filter;
use crate::store::{SqliteStore, Store, StoreResult, Window};
use log::{debug, warn};
use rusqlite::Connection;
use std::marker::PhantomData;

/// CRUD contract for one entity type.
pub trait MinimalRepository<E: Entity> {
    /// Adds `entity`; `Success` iff a row was inserted.
    fn save(&self, entity: &E) -> OperationResult;

    /// Replaces the stored row with `entity`'s key; `Failed` when absent.
    fn update(&self, entity: &E) -> OperationResult;

    /// Removes the row with `entity`'s key; `Failed` when absent.
    fn delete(&self, entity: &E) -> OperationResult;

    /// Every record, materialized, in store order.
    fn retrieve_all(&self) -> RepoResult<Vec<E>>;

    /// Looks up one record by key.
    ///
    /// # Errors
    /// `RepoError::InvalidKeyType` when `key` is not of the entity's key kind.
    fn retrieve_by_id(&self, key: impl Into<Key>) -> RepoResult<Option<E>>;
}

/// Read-only queries layered on `MinimalRepository`.
pub trait Repository<E: Entity>: MinimalRepository<E> {
    fn count(&self) -> RepoResult<u64>;

    fn count_where(&self, filter: &Filter) -> RepoResult<u64>;

    /// Key lookup; same key rules as `retrieve_by_id`.
    fn exists(&self, key: impl Into<Key>) -> RepoResult<bool>;

    fn find_all(&self, filter: &Filter) -> RepoResult<Vec<E>>;

    /// First match in store order; further matches are ignored.
    fn find_single(&self, filter: &Filter) -> RepoResult<Option<E>>;

    /// Records `[(page_number - 1) * page_size, page_number * page_size)`.
    fn paged(&self, page_number: u32, page_size: u32) -> RepoResult<Vec<E>>;

    /// Same window as `paged`, applied after `filter`.
    fn paged_where(
        &self,
        filter: &Filter,
        page_number: u32,
        page_size: u32,
    ) -> RepoResult<Vec<E>>;
}

/// Repository for `E` backed by store `S`.
pub struct EntityRepository<S, E> {
    store: S,
    _entity: PhantomData<fn() -> E>,
}

impl<S: Store, E: Entity> EntityRepository<S, E> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn write(&self, op: &'static str, result: StoreResult<usize>) -> OperationResult {
        match result {
            Ok(affected) => {
                let outcome = OperationResult::from_affected(affected);
                if outcome.is_success() {
                    debug!(
                        "event=repo_write module=repo op={op} table={} status=ok affected={affected}",
                        E::TABLE
                    );
                } else {
                    let reason = if op == "save" {
                        "no_rows_affected"
                    } else {
                        "not_found"
                    };
                    warn!(
                        "event=repo_write module=repo op={op} table={} status=failed reason={reason}",
                        E::TABLE
                    );
                }
                outcome
            }
            Err(err) => {
                warn!(
                    "event=repo_write module=repo op={op} table={} status=failed reason=store_error error={err}",
                    E::TABLE
                );
                OperationResult::Failed
            }
        }
    }

    fn read<T>(&self, op: &'static str, result: StoreResult<T>) -> RepoResult<T> {
        match result {
            Ok(value) => {
                debug!("event=repo_read module=repo op={op} table={} status=ok", E::TABLE);
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "event=repo_read module=repo op={op} table={} status=error error={err}",
                    E::TABLE
                );
                Err(err.into())
            }
        }
    }

    fn checked_key(&self, key: impl Into<Key>) -> RepoResult<Key> {
        let key = key.into();
        key.ensure_kind(<E::Key as EntityKey>::KIND)?;
        Ok(key)
    }

    fn window(&self, filter: &Filter, window: Window, op: &'static str) -> RepoResult<Vec<E>> {
        if window.limit == Some(0) {
            return Ok(Vec::new());
        }
        self.read(op, self.store.query(filter, window))
    }
}

impl<'conn, E: Entity> EntityRepository<SqliteStore<'conn>, E> {
    /// Repository over a SQLite connection.
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(SqliteStore::new(conn))
    }
}

impl<S: Store, E: Entity> MinimalRepository<E> for EntityRepository<S, E> {
    fn save(&self, entity: &E) -> OperationResult {
        self.write("save", self.store.insert(entity))
    }

    fn update(&self, entity: &E) -> OperationResult {
        self.write("update", self.store.replace_existing(entity))
    }

    fn delete(&self, entity: &E) -> OperationResult {
        let key = entity.key().to_key();
        self.write("delete", self.store.remove::<E>(&key))
    }

    fn retrieve_all(&self) -> RepoResult<Vec<E>> {
        self.read(
            "retrieve_all",
            self.store.query(&Filter::All, Window::unbounded()),
        )
    }

    fn retrieve_by_id(&self, key: impl Into<Key>) -> RepoResult<Option<E>> {
        let key = self.checked_key(key)?;
        self.read("retrieve_by_id", self.store.find_by_key(&key))
    }
}

impl<S: Store, E: Entity> Repository<E> for EntityRepository<S, E> {
    fn count(&self) -> RepoResult<u64> {
        self.read("count", self.store.count::<E>(&Filter::All))
    }

    fn count_where(&self, filter: &Filter) -> RepoResult<u64> {
        self.read("count_where", self.store.count::<E>(filter))
    }

    fn exists(&self, key: impl Into<Key>) -> RepoResult<bool> {
        let key = self.checked_key(key)?;
        let found = self.read("exists", self.store.find_by_key::<E>(&key))?;
        Ok(found.is_some())
    }

    fn find_all(&self, filter: &Filter) -> RepoResult<Vec<E>> {
        self.read("find_all", self.store.query(filter, Window::unbounded()))
    }

    fn find_single(&self, filter: &Filter) -> RepoResult<Option<E>> {
        let first: Vec<E> = self.read("find_single", self.store.query(filter, Window::first(1)))?;
        Ok(first.into_iter().next())
    }

    fn paged(&self, page_number: u32, page_size: u32) -> RepoResult<Vec<E>> {
        self.window(&Filter::All, Window::page(page_number, page_size), "paged")
    }

    fn paged_where(
        &self,
        filter: &Filter,
        page_number: u32,
        page_size: u32,
    ) -> RepoResult<Vec<E>> {
        self.window(filter, Window::page(page_number, page_size), "paged_where")
    }
}
