//! Shared utilities

pub mod interning;

pub use interning::Atom;
