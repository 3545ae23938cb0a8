//! Entity contract shared by every repository.
//!
//! # Responsibility
//! - Define how a record type maps onto one table.
//! - Define the closed set of key types repositories can dispatch on.
//!
//! # Invariants
//! - Every entity is identified by exactly one key column.
//! - Keys are either integers or text; nothing else reaches the store.

pub mod entity;
pub mod key;
