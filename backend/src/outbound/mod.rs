//! Outbound adapters implementing domain ports.
//!
//! - **memory**: mutex-guarded in-process store with atomic conditional
//!   writes.
//! - **snapshot**: JSON snapshot loader that resolves references and seeds
//!   the in-memory store.
//!
//! Adapters translate between domain types and their storage representation.
//! They contain no business rules.

pub mod memory;
pub mod snapshot;
