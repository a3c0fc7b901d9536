//! Core data structures for slipway.
//!
//! The foundational types used throughout the crate:
//! - labels and source directories (interned identity values)
//! - targets and the resolved build graph
//! - project-file schemas and the workspace loader

pub mod graph;
pub mod label;
pub mod manifest;
pub mod source_dir;
pub mod target;
pub mod workspace;

pub use graph::{BuildGraph, GraphError};
pub use label::{Label, LabelError};
pub use manifest::{BuildManifest, TargetDecl, WorkspaceManifest, BUILD_FILE, WORKSPACE_FILE};
pub use source_dir::SourceDir;
pub use target::{Language, LibFile, OutputType, Target};
pub use workspace::{Workspace, DEFAULT_TOOLCHAIN};
