//! Typed CRUD repositories over SQLite.
//! Entities describe their table; repositories do the rest.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod query;
pub mod repo;
pub mod store;

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{Column, ColumnType, Entity};
pub use model::key::{EntityKey, Key, KeyKind};
pub use pagination::Paginator;
pub use query::filter::{Filter, FilterCondition, FilterOperator, FilterValue};
pub use repo::{
    EntityRepository, MinimalRepository, OperationResult, RepoError, RepoResult, Repository,
};
pub use store::{SqliteStore, Store, StoreError, StoreResult, Window};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
