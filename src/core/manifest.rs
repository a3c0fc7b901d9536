//! Project-file parsing and schema.
//!
//! Two declarative files describe a workspace: `slipway.toml` at the root
//! (workspace marker plus the default toolchain) and a `BUILD.toml` in any
//! subdirectory declaring targets under `[targets.<name>]` tables. These
//! are plain data - there is no build language to evaluate.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::core::label::Label;
use crate::core::source_dir::SourceDir;
use crate::core::target::{Language, LibFile, OutputType, Target};
use crate::util::Atom;

/// Workspace root marker file.
pub const WORKSPACE_FILE: &str = "slipway.toml";

/// Per-directory target declaration file.
pub const BUILD_FILE: &str = "BUILD.toml";

/// The parsed `slipway.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceManifest {
    /// Label of the toolchain applied to targets that do not name one,
    /// e.g. `"//toolchain:clang"`.
    #[serde(default)]
    pub default_toolchain: Option<String>,
}

impl WorkspaceManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// The parsed `BUILD.toml` of one directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildManifest {
    /// Declared targets, keyed by short name.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetDecl>,
}

impl BuildManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// One `[targets.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetDecl {
    /// What kind of artifact to produce
    #[serde(rename = "type")]
    pub output_type: OutputType,

    /// Source language (c, c++, rust)
    #[serde(default)]
    pub lang: Language,

    /// Static libraries only: archive already contains all transitive
    /// objects, so nothing propagates through it
    #[serde(default)]
    pub complete: bool,

    /// Dependents must be ordered after this target
    #[serde(default)]
    pub hard_dep: bool,

    /// Libraries to link: bare names or workspace-absolute files
    #[serde(default)]
    pub libs: Vec<String>,

    /// Library search paths, relative to this directory or absolute
    #[serde(default)]
    pub lib_dirs: Vec<String>,

    #[serde(default)]
    pub frameworks: Vec<String>,

    #[serde(default)]
    pub weak_frameworks: Vec<String>,

    #[serde(default)]
    pub framework_dirs: Vec<String>,

    /// Dependencies whose link surface propagates to dependents
    #[serde(default)]
    pub public_deps: Vec<String>,

    /// Private dependencies
    #[serde(default)]
    pub deps: Vec<String>,

    /// Runtime-only dependencies
    #[serde(default)]
    pub data_deps: Vec<String>,
}

impl TargetDecl {
    /// Turn a declaration into a resolved [`Target`]. `dir` is the source
    /// directory of the declaring `BUILD.toml`; labels and search paths
    /// resolve against it.
    pub fn into_target(
        self,
        dir: SourceDir,
        name: &str,
        default_toolchain: &Label,
    ) -> Result<Target> {
        if self.complete && self.output_type != OutputType::StaticLibrary {
            bail!(
                "target `{}{}` sets complete = true but is a {}\n\
                 hint: only static_library targets can be complete",
                dir,
                name,
                self.output_type
            );
        }

        let label = Label::with_toolchain(
            dir,
            name,
            default_toolchain.dir(),
            default_toolchain.name_atom(),
        );

        let resolve_deps = |specs: &[String]| -> Result<Vec<Label>> {
            specs
                .iter()
                .map(|s| {
                    Label::resolve(dir, default_toolchain, s)
                        .with_context(|| format!("in target `{}`", label))
                })
                .collect()
        };

        let resolve_dirs = |specs: &[String]| -> Result<Vec<SourceDir>> {
            specs
                .iter()
                .map(|s| {
                    dir.resolve(s).with_context(|| {
                        format!("in target `{}`: bad directory `{}`", label, s)
                    })
                })
                .collect()
        };

        let target = Target::new(label, self.output_type)
            .with_lang(self.lang)
            .with_complete_static_lib(self.complete)
            .with_hard_dep(self.hard_dep)
            .with_libs(self.libs.iter().map(LibFile::new))
            .with_lib_dirs(resolve_dirs(&self.lib_dirs)?)
            .with_frameworks(self.frameworks.iter().map(Atom::new))
            .with_weak_frameworks(self.weak_frameworks.iter().map(Atom::new))
            .with_framework_dirs(resolve_dirs(&self.framework_dirs)?)
            .with_public_deps(resolve_deps(&self.public_deps)?)
            .with_private_deps(resolve_deps(&self.deps)?)
            .with_data_deps(resolve_deps(&self.data_deps)?);

        Ok(target)
    }
}
