//! Target definitions - what gets built.
//!
//! A `Target` is one node of the resolved build graph: an executable,
//! library, source set, group, or action, together with its own link
//! inputs and its immediate dependencies. Targets are immutable once the
//! graph is loaded; all transitive views are computed by the aggregator
//! in [`crate::resolved`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::label::Label;
use crate::core::source_dir::SourceDir;
use crate::util::Atom;

/// Source language of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C language (default)
    #[default]
    C,
    /// C++ language
    #[serde(alias = "cpp", alias = "cxx", alias = "c++")]
    Cxx,
    /// Rust language
    Rust,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
            Language::Rust => "rust",
        }
    }
}

/// The kind of artifact a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// Executable binary
    #[serde(alias = "exe", alias = "bin")]
    Executable,

    /// Static library (.a / .lib)
    #[serde(alias = "static")]
    StaticLibrary,

    /// Shared/dynamic library (.so / .dylib / .dll)
    #[serde(alias = "shared")]
    SharedLibrary,

    /// Compiled objects linked directly into dependents
    SourceSet,

    /// A named collection that only forwards its dependencies
    Group,

    /// A script invocation with declared inputs and outputs
    Action,

    /// A file-copy step
    Copy,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Executable => "executable",
            OutputType::StaticLibrary => "static_library",
            OutputType::SharedLibrary => "shared_library",
            OutputType::SourceSet => "source_set",
            OutputType::Group => "group",
            OutputType::Action => "action",
            OutputType::Copy => "copy",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A library to pass to the linker: either a bare name (`z`, linked with
/// `-lz`) or a workspace-absolute file (`//prebuilt/libfoo.a`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LibFile {
    value: Atom,
}

impl LibFile {
    pub fn new(value: impl Into<Atom>) -> Self {
        LibFile { value: value.into() }
    }

    pub fn value(&self) -> &'static str {
        self.value.as_str()
    }

    /// Whether this names a file in the workspace rather than a bare
    /// library name.
    pub fn is_source_file(&self) -> bool {
        self.value.as_str().starts_with("//")
    }
}

impl fmt::Debug for LibFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LibFile({:?})", self.value)
    }
}

impl fmt::Display for LibFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value.as_str())
    }
}

/// One resolved node of the build graph.
///
/// Dependency lists hold labels in declaration order; the owning
/// [`crate::core::BuildGraph`] maps them back to targets. The public /
/// private split controls how link-time data propagates to dependents.
#[derive(Debug, Clone)]
pub struct Target {
    label: Label,
    output_type: OutputType,
    lang: Language,

    /// Static-library-only flag: the archive already contains the objects
    /// of all its transitive deps, so nothing propagates through it.
    complete_static_lib: bool,

    /// When set, dependents must be ordered after this target in the
    /// generated build graph.
    hard_dep: bool,

    libs: Vec<LibFile>,
    lib_dirs: Vec<SourceDir>,
    frameworks: Vec<Atom>,
    weak_frameworks: Vec<Atom>,
    framework_dirs: Vec<SourceDir>,

    public_deps: Vec<Label>,
    private_deps: Vec<Label>,
    data_deps: Vec<Label>,
}

impl Target {
    pub fn new(label: Label, output_type: OutputType) -> Self {
        Target {
            label,
            output_type,
            lang: Language::default(),
            complete_static_lib: false,
            hard_dep: false,
            libs: Vec::new(),
            lib_dirs: Vec::new(),
            frameworks: Vec::new(),
            weak_frameworks: Vec::new(),
            framework_dirs: Vec::new(),
            public_deps: Vec::new(),
            private_deps: Vec::new(),
            data_deps: Vec::new(),
        }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn lang(&self) -> Language {
        self.lang
    }

    pub fn is_rust(&self) -> bool {
        self.lang == Language::Rust
    }

    pub fn is_complete_static_lib(&self) -> bool {
        self.complete_static_lib
    }

    pub fn hard_dep(&self) -> bool {
        self.hard_dep
    }

    pub fn libs(&self) -> &[LibFile] {
        &self.libs
    }

    pub fn lib_dirs(&self) -> &[SourceDir] {
        &self.lib_dirs
    }

    pub fn frameworks(&self) -> &[Atom] {
        &self.frameworks
    }

    pub fn weak_frameworks(&self) -> &[Atom] {
        &self.weak_frameworks
    }

    pub fn framework_dirs(&self) -> &[SourceDir] {
        &self.framework_dirs
    }

    pub fn public_deps(&self) -> &[Label] {
        &self.public_deps
    }

    pub fn private_deps(&self) -> &[Label] {
        &self.private_deps
    }

    pub fn data_deps(&self) -> &[Label] {
        &self.data_deps
    }

    /// Link-relevant dep edges in declaration order: public deps first,
    /// then private, each with its edge-public flag.
    pub fn link_deps(&self) -> impl Iterator<Item = (Label, bool)> + '_ {
        self.public_deps
            .iter()
            .map(|l| (*l, true))
            .chain(self.private_deps.iter().map(|l| (*l, false)))
    }

    /// Every dep edge: public, private, and data.
    pub fn all_deps(&self) -> impl Iterator<Item = Label> + '_ {
        self.public_deps
            .iter()
            .chain(self.private_deps.iter())
            .chain(self.data_deps.iter())
            .copied()
    }

    /// Whether this target produces something a linker consumes. Rust
    /// libraries are static libraries with a Rust language tag.
    pub fn is_linkable(&self) -> bool {
        matches!(
            self.output_type,
            OutputType::StaticLibrary | OutputType::SharedLibrary | OutputType::SourceSet
        )
    }

    /// Whether transitive link data stops at this target: its output
    /// already embeds everything it depends on.
    pub fn is_final(&self) -> bool {
        match self.output_type {
            OutputType::SharedLibrary
            | OutputType::Executable
            | OutputType::Action
            | OutputType::Copy => true,
            OutputType::StaticLibrary => self.complete_static_lib,
            OutputType::SourceSet | OutputType::Group => false,
        }
    }

    // Builder-style setters used by the loader and tests.

    pub fn with_lang(mut self, lang: Language) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_complete_static_lib(mut self, complete: bool) -> Self {
        self.complete_static_lib = complete;
        self
    }

    pub fn with_hard_dep(mut self, hard_dep: bool) -> Self {
        self.hard_dep = hard_dep;
        self
    }

    pub fn with_libs(mut self, libs: impl IntoIterator<Item = LibFile>) -> Self {
        self.libs = libs.into_iter().collect();
        self
    }

    pub fn with_lib_dirs(mut self, dirs: impl IntoIterator<Item = SourceDir>) -> Self {
        self.lib_dirs = dirs.into_iter().collect();
        self
    }

    pub fn with_frameworks(mut self, frameworks: impl IntoIterator<Item = Atom>) -> Self {
        self.frameworks = frameworks.into_iter().collect();
        self
    }

    pub fn with_weak_frameworks(mut self, frameworks: impl IntoIterator<Item = Atom>) -> Self {
        self.weak_frameworks = frameworks.into_iter().collect();
        self
    }

    pub fn with_framework_dirs(mut self, dirs: impl IntoIterator<Item = SourceDir>) -> Self {
        self.framework_dirs = dirs.into_iter().collect();
        self
    }

    pub fn with_public_deps(mut self, deps: impl IntoIterator<Item = Label>) -> Self {
        self.public_deps = deps.into_iter().collect();
        self
    }

    pub fn with_private_deps(mut self, deps: impl IntoIterator<Item = Label>) -> Self {
        self.private_deps = deps.into_iter().collect();
        self
    }

    pub fn with_data_deps(mut self, deps: impl IntoIterator<Item = Label>) -> Self {
        self.data_deps = deps.into_iter().collect();
        self
    }
}
