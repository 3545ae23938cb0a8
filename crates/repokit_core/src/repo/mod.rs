//! Repository contracts and their store-backed implementation.
//!
//! # Responsibility
//! - Expose entity-agnostic CRUD, counting, filtering and paging.
//! - Translate store affected-row counts into `OperationResult`s.
//!
//! # Invariants
//! - Mutating calls never return `Err`; every store fault becomes `Failed`
//!   and is logged with its cause.
//! - Key kind mismatches are contract violations (`InvalidKeyType`), never
//!   reported as absence.
//! - Repositories hold no entity state between calls.

mod entity_repo;
mod error;
mod outcome;

pub use entity_repo::{EntityRepository, MinimalRepository, Repository};
pub use error::{RepoError, RepoResult};
pub use outcome::OperationResult;
