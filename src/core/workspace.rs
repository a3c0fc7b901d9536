//! Workspace - root discovery and graph loading.
//!
//! A `Workspace` finds the root marker file, reads the workspace
//! configuration, then walks the tree for `BUILD.toml` files and
//! assembles the resolved [`BuildGraph`]. The walk is sorted so the
//! loaded graph is identical across runs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::core::graph::BuildGraph;
use crate::core::label::Label;
use crate::core::manifest::{BuildManifest, WorkspaceManifest, BUILD_FILE, WORKSPACE_FILE};
use crate::core::source_dir::SourceDir;

/// Toolchain applied when `slipway.toml` does not name one.
pub const DEFAULT_TOOLCHAIN: &str = "//toolchain:default";

/// A loaded workspace: root path, default toolchain, and the resolved
/// target graph.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    default_toolchain: Label,
    graph: BuildGraph,
}

impl Workspace {
    /// Locate the workspace root by searching upward from `start` for the
    /// root marker file.
    pub fn find_root(start: &Path) -> Result<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            if current.join(WORKSPACE_FILE).is_file() {
                return Ok(current);
            }
            if !current.pop() {
                bail!(
                    "no {} found in `{}` or any parent directory",
                    WORKSPACE_FILE,
                    start.display()
                );
            }
        }
    }

    /// Read the workspace configuration at `dir`. The graph starts empty;
    /// call [`Self::load`] to fill it.
    pub fn open(dir: &Path) -> Result<Self> {
        let root = Self::find_root(dir)?;
        let manifest = WorkspaceManifest::load(&root.join(WORKSPACE_FILE))?;

        let toolchain_spec = manifest
            .default_toolchain
            .as_deref()
            .unwrap_or(DEFAULT_TOOLCHAIN);
        let default_toolchain =
            Label::resolve(SourceDir::root(), &Label::null(), toolchain_spec)
                .with_context(|| format!("bad default_toolchain in {}", WORKSPACE_FILE))?;

        Ok(Workspace {
            root,
            default_toolchain,
            graph: BuildGraph::new(),
        })
    }

    /// Walk the tree for `BUILD.toml` files, parse every declared target,
    /// and validate the resulting graph.
    pub fn load(&mut self) -> Result<()> {
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = entry.with_context(|| "failed to walk workspace")?;
            if !entry.file_type().is_file() || entry.file_name() != BUILD_FILE {
                continue;
            }
            self.load_build_file(entry.path())?;
        }

        self.graph.validate()?;
        tracing::debug!("loaded {} targets", self.graph.len());
        Ok(())
    }

    fn load_build_file(&mut self, path: &Path) -> Result<()> {
        let dir = self.source_dir_of(path)?;
        let manifest = BuildManifest::load(path)?;

        for (name, decl) in manifest.targets {
            let target = decl
                .into_target(dir, &name, &self.default_toolchain)
                .with_context(|| format!("in {}", path.display()))?;
            self.graph.add_target(target)?;
        }
        Ok(())
    }

    /// Source directory of a `BUILD.toml` path (`<root>/a/b/BUILD.toml`
    /// becomes `//a/b/`).
    fn source_dir_of(&self, path: &Path) -> Result<SourceDir> {
        let rel = path
            .parent()
            .unwrap_or(Path::new(""))
            .strip_prefix(&self.root)
            .with_context(|| format!("{} is outside the workspace", path.display()))?;

        let mut dir = SourceDir::root();
        for comp in rel.components() {
            let part = comp.as_os_str().to_string_lossy();
            dir = dir
                .join(&part)
                .with_context(|| format!("bad path component `{}`", part))?;
        }
        Ok(dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn default_toolchain(&self) -> &Label {
        &self.default_toolchain
    }

    pub fn graph(&self) -> &BuildGraph {
        &self.graph
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
