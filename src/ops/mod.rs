//! High-level operations.
//!
//! Implementations of the queries exposed by the CLI and the query
//! server.

pub mod desc;

pub use desc::run_desc;
