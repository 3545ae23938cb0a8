//! Caller-built predicates forwarded to the store.
//!
//! The repository never inspects a `Filter`; only the store renders it.

pub mod filter;
