//! Slipway - a meta-build generator core
//!
//! This crate loads a declarative description of a project (targets,
//! toolchains, and dependency edges spread across `BUILD.toml` files),
//! resolves it into a flat immutable graph, and computes the transitive
//! link-time data a build-file writer or IDE generator needs. A local
//! query server exposes the resolved data to external clients over a
//! unix-domain socket.

pub mod core;
pub mod ops;
pub mod query;
pub mod resolved;
pub mod util;

pub use crate::core::{
    BuildGraph, Label, LabelError, Language, LibFile, OutputType, SourceDir, Target, Workspace,
};
pub use crate::query::QueryServer;
pub use crate::resolved::ResolvedTargetData;
pub use crate::util::Atom;
