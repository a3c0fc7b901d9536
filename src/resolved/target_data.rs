//! Per-target transitive data, computed on demand and memoized.
//!
//! `ResolvedTargetData` answers the questions a linker or generator asks
//! about a resolved target: which libraries and search paths it inherits,
//! which frameworks, which dependencies must be ordered before it, and -
//! for Rust - the full transitive library closure. Values are computed by
//! a post-order walk over the dependency subgraph on first request and
//! cached for the life of the instance.
//!
//! The backing graph is immutable and shared; one instance per thread
//! gives lock-free parallel queries over the same graph. A single
//! instance is not meant to be shared across threads.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use thiserror::Error;

use crate::core::graph::BuildGraph;
use crate::core::label::Label;
use crate::core::source_dir::SourceDir;
use crate::core::target::{LibFile, OutputType, Target};
use crate::resolved::public_pair::{
    TargetPublicPair, TargetPublicPairList, TargetPublicPairListBuilder,
};
use crate::util::Atom;

/// Errors from aggregation. The loader guarantees an acyclic, closed
/// graph, so these indicate a malformed input rather than a user mistake.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("dependency cycle detected at `{label}`")]
    CycleDetected { label: String },

    #[error("target `{from}` depends on `{dep}`, which is not in the graph")]
    MissingDependency { from: String, dep: String },
}

/// Link-time library data for one target.
#[derive(Debug, Clone)]
pub struct LibInfo {
    /// Search paths for the final link command (`-Ldir` for a C linker).
    pub all_lib_dirs: Rc<[SourceDir]>,
    /// Libraries for the final link command (`-lfoo` or a file path).
    pub all_libs: Rc<[LibFile]>,
}

/// Link-time framework data for one target (macOS/iOS binaries).
#[derive(Debug, Clone)]
pub struct FrameworkInfo {
    pub all_framework_dirs: Rc<[SourceDir]>,
    pub all_frameworks: Rc<[Atom]>,
    pub all_weak_frameworks: Rc<[Atom]>,
}

/// An unordered set of targets; only membership is observable.
pub type TargetSet = Rc<HashSet<Label>>;

/// Which query a DFS is currently serving, for cycle detection.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Query {
    InheritedLibs,
    RustInheritedLibs,
    HardDeps,
}

/// The five memoized views for one target.
#[derive(Default)]
struct TargetInfo<'g> {
    lib_info: Option<LibInfo>,
    framework_info: Option<FrameworkInfo>,
    inherited_libs: Option<TargetPublicPairList<'g>>,
    rust_inherited_libs: Option<TargetPublicPairList<'g>>,
    hard_deps: Option<TargetSet>,
}

/// Memoized computer of transitive target data over one resolved graph.
pub struct ResolvedTargetData<'g> {
    graph: &'g BuildGraph,
    cache: RefCell<HashMap<Label, TargetInfo<'g>>>,
    in_progress: RefCell<HashSet<(Label, Query)>>,
}

impl<'g> ResolvedTargetData<'g> {
    pub fn new(graph: &'g BuildGraph) -> Self {
        ResolvedTargetData {
            graph,
            cache: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
        }
    }

    /// Ordered, deduplicated (target, is_public) pairs for every
    /// link-time library inherited by `target`.
    ///
    /// Static libraries, source sets, and groups forward their own
    /// inherited lists (publicness ANDed across the edge); shared and
    /// complete static libraries contribute only themselves. The target
    /// itself never appears.
    pub fn inherited_libraries(
        &self,
        target: &'g Target,
    ) -> Result<TargetPublicPairList<'g>, AggregationError> {
        let label = target.label();
        if let Some(list) = self.cached(&label, |i| i.inherited_libs.clone()) {
            return Ok(list);
        }

        self.enter(label, Query::InheritedLibs)?;
        let computed = self.compute_inherited_libraries(target, false);
        self.exit(label, Query::InheritedLibs);

        let list = computed?;
        self.cache.borrow_mut().entry(label).or_default().inherited_libs = Some(list.clone());
        Ok(list)
    }

    /// Like [`Self::inherited_libraries`], but Rust-aware: a Rust library
    /// also propagates its whole transitive Rust closure through
    /// shared-library boundaries, because rustc needs every rlib and
    /// dylib on the command line. Non-Rust deps follow the standard rule.
    pub fn rust_transitive_inherited_libs(
        &self,
        target: &'g Target,
    ) -> Result<TargetPublicPairList<'g>, AggregationError> {
        let label = target.label();
        if let Some(list) = self.cached(&label, |i| i.rust_inherited_libs.clone()) {
            return Ok(list);
        }

        self.enter(label, Query::RustInheritedLibs)?;
        let computed = self.compute_inherited_libraries(target, true);
        self.exit(label, Query::RustInheritedLibs);

        let list = computed?;
        self.cache
            .borrow_mut()
            .entry(label)
            .or_default()
            .rust_inherited_libs = Some(list.clone());
        Ok(list)
    }

    /// Library files and search paths for the final link command:
    /// `target`'s own values followed by those of every inherited
    /// library, first occurrence kept.
    pub fn lib_info(&self, target: &'g Target) -> Result<LibInfo, AggregationError> {
        let label = target.label();
        if let Some(info) = self.cached(&label, |i| i.lib_info.clone()) {
            return Ok(info);
        }

        let inherited = self.inherited_libraries(target)?;

        let mut lib_dirs = DedupList::new();
        let mut libs = DedupList::new();
        lib_dirs.extend(target.lib_dirs().iter().copied());
        libs.extend(target.libs().iter().copied());
        for pair in inherited.iter() {
            lib_dirs.extend(pair.target().lib_dirs().iter().copied());
            libs.extend(pair.target().libs().iter().copied());
        }

        let info = LibInfo {
            all_lib_dirs: lib_dirs.build(),
            all_libs: libs.build(),
        };
        self.cache.borrow_mut().entry(label).or_default().lib_info = Some(info.clone());
        Ok(info)
    }

    pub fn all_libs(&self, target: &'g Target) -> Result<Rc<[LibFile]>, AggregationError> {
        Ok(self.lib_info(target)?.all_libs)
    }

    pub fn all_lib_dirs(&self, target: &'g Target) -> Result<Rc<[SourceDir]>, AggregationError> {
        Ok(self.lib_info(target)?.all_lib_dirs)
    }

    /// Framework lists for the final link command, built the same way as
    /// [`Self::lib_info`].
    pub fn framework_info(&self, target: &'g Target) -> Result<FrameworkInfo, AggregationError> {
        let label = target.label();
        if let Some(info) = self.cached(&label, |i| i.framework_info.clone()) {
            return Ok(info);
        }

        let inherited = self.inherited_libraries(target)?;

        let mut dirs = DedupList::new();
        let mut frameworks = DedupList::new();
        let mut weak = DedupList::new();
        dirs.extend(target.framework_dirs().iter().copied());
        frameworks.extend(target.frameworks().iter().copied());
        weak.extend(target.weak_frameworks().iter().copied());
        for pair in inherited.iter() {
            dirs.extend(pair.target().framework_dirs().iter().copied());
            frameworks.extend(pair.target().frameworks().iter().copied());
            weak.extend(pair.target().weak_frameworks().iter().copied());
        }

        let info = FrameworkInfo {
            all_framework_dirs: dirs.build(),
            all_frameworks: frameworks.build(),
            all_weak_frameworks: weak.build(),
        };
        self.cache.borrow_mut().entry(label).or_default().framework_info = Some(info.clone());
        Ok(info)
    }

    pub fn all_frameworks(&self, target: &'g Target) -> Result<Rc<[Atom]>, AggregationError> {
        Ok(self.framework_info(target)?.all_frameworks)
    }

    pub fn all_weak_frameworks(&self, target: &'g Target) -> Result<Rc<[Atom]>, AggregationError> {
        Ok(self.framework_info(target)?.all_weak_frameworks)
    }

    pub fn all_framework_dirs(
        &self,
        target: &'g Target,
    ) -> Result<Rc<[SourceDir]>, AggregationError> {
        Ok(self.framework_info(target)?.all_framework_dirs)
    }

    /// Every target reachable from `target` (over public, private, and
    /// data edges) whose hard-dep bit is set. These must become in-order
    /// inputs in the generated build graph.
    pub fn recursive_hard_deps(&self, target: &'g Target) -> Result<TargetSet, AggregationError> {
        let label = target.label();
        if let Some(set) = self.cached(&label, |i| i.hard_deps.clone()) {
            return Ok(set);
        }

        self.enter(label, Query::HardDeps)?;
        let computed = self.compute_hard_deps(target);
        self.exit(label, Query::HardDeps);

        let set = computed?;
        self.cache.borrow_mut().entry(label).or_default().hard_deps = Some(set.clone());
        Ok(set)
    }

    fn compute_inherited_libraries(
        &self,
        target: &'g Target,
        rust_aware: bool,
    ) -> Result<TargetPublicPairList<'g>, AggregationError> {
        let mut builder = TargetPublicPairListBuilder::new();

        for (dep_label, edge_public) in target.link_deps() {
            let dep = self.dep_target(target, &dep_label)?;

            // Rust libraries carry their closure through the shared-library
            // boundary. A complete static library is terminal regardless of
            // language and falls through to the arm below.
            if rust_aware
                && dep.is_rust()
                && dep.is_linkable()
                && !dep.is_complete_static_lib()
            {
                builder.append(dep, edge_public);
                let inner = self.rust_transitive_inherited_libs(dep)?;
                builder.append_inherited(&inner, edge_public);
                continue;
            }

            match dep.output_type() {
                OutputType::SharedLibrary => {
                    // Shared libraries embed their inputs; nothing behind
                    // them propagates.
                    builder.append(dep, edge_public);
                }
                OutputType::StaticLibrary if dep.is_complete_static_lib() => {
                    builder.append(dep, edge_public);
                }
                OutputType::StaticLibrary | OutputType::SourceSet | OutputType::Group => {
                    builder.append(dep, edge_public);
                    let inner = if rust_aware {
                        self.rust_transitive_inherited_libs(dep)?
                    } else {
                        self.inherited_libraries(dep)?
                    };
                    builder.append_inherited(&inner, edge_public);
                }
                OutputType::Executable | OutputType::Action | OutputType::Copy => {}
            }
        }

        Ok(builder.build())
    }

    fn compute_hard_deps(&self, target: &'g Target) -> Result<TargetSet, AggregationError> {
        let mut set = HashSet::new();
        for dep_label in target.all_deps() {
            let dep = self.dep_target(target, &dep_label)?;
            if dep.hard_dep() {
                set.insert(dep.label());
            }
            set.extend(self.recursive_hard_deps(dep)?.iter().copied());
        }
        Ok(Rc::new(set))
    }

    fn dep_target(
        &self,
        from: &Target,
        dep: &Label,
    ) -> Result<&'g Target, AggregationError> {
        self.graph
            .target(dep)
            .ok_or_else(|| AggregationError::MissingDependency {
                from: from.label().user_visible_name(true),
                dep: dep.user_visible_name(true),
            })
    }

    fn cached<T>(&self, label: &Label, get: impl FnOnce(&TargetInfo<'g>) -> Option<T>) -> Option<T> {
        self.cache.borrow().get(label).and_then(get)
    }

    fn enter(&self, label: Label, query: Query) -> Result<(), AggregationError> {
        if !self.in_progress.borrow_mut().insert((label, query)) {
            return Err(AggregationError::CycleDetected {
                label: label.user_visible_name(true),
            });
        }
        Ok(())
    }

    fn exit(&self, label: Label, query: Query) {
        self.in_progress.borrow_mut().remove(&(label, query));
    }
}

/// Order-preserving dedup accumulator: first occurrence wins.
struct DedupList<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Copy + Eq + std::hash::Hash> DedupList<T> {
    fn new() -> Self {
        DedupList { items: Vec::new(), seen: HashSet::new() }
    }

    fn extend(&mut self, iter: impl Iterator<Item = T>) {
        for item in iter {
            if self.seen.insert(item) {
                self.items.push(item);
            }
        }
    }

    fn build(self) -> Rc<[T]> {
        self.items.into()
    }
}

/// Render a pair list as (label, publicness) tuples, the form assertions
/// and external consumers compare against.
pub fn pairs_to_labels(list: &[TargetPublicPair<'_>]) -> Vec<(String, bool)> {
    list.iter()
        .map(|p| (p.target().label().user_visible_name(false), p.is_public()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::Language;

    fn label(s: &str) -> Label {
        let tc = Label::new(SourceDir::new("//tc").unwrap(), "default");
        Label::resolve(SourceDir::root(), &tc, s).unwrap()
    }

    struct GraphBuilder {
        graph: BuildGraph,
    }

    impl GraphBuilder {
        fn new() -> Self {
            GraphBuilder { graph: BuildGraph::new() }
        }

        fn add(&mut self, target: Target) -> &mut Self {
            self.graph.add_target(target).unwrap();
            self
        }

        fn build(self) -> BuildGraph {
            self.graph
        }
    }

    fn lookup<'g>(graph: &'g BuildGraph, name: &str) -> &'g Target {
        graph.target(&label(name)).unwrap()
    }

    #[test]
    fn test_diamond_dedup_and_publicness() {
        // E (exe) --public--> A (static) --public--> B (static)
        // E --private--> B
        let mut b = GraphBuilder::new();
        b.add(Target::new(label("//b:b"), OutputType::StaticLibrary))
            .add(
                Target::new(label("//a:a"), OutputType::StaticLibrary)
                    .with_public_deps([label("//b:b")]),
            )
            .add(
                Target::new(label("//e:e"), OutputType::Executable)
                    .with_public_deps([label("//a:a")])
                    .with_private_deps([label("//b:b")]),
            );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let list = data.inherited_libraries(lookup(&graph, "//e:e")).unwrap();

        assert_eq!(
            pairs_to_labels(&list),
            vec![("//a:a".to_string(), true), ("//b:b".to_string(), true)]
        );
    }

    #[test]
    fn test_shared_library_barrier() {
        // E (exe) --public--> S (shared) --public--> I (static)
        let mut b = GraphBuilder::new();
        b.add(Target::new(label("//i:i"), OutputType::StaticLibrary))
            .add(
                Target::new(label("//s:s"), OutputType::SharedLibrary)
                    .with_public_deps([label("//i:i")]),
            )
            .add(
                Target::new(label("//e:e"), OutputType::Executable)
                    .with_public_deps([label("//s:s")]),
            );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let list = data.inherited_libraries(lookup(&graph, "//e:e")).unwrap();

        assert_eq!(pairs_to_labels(&list), vec![("//s:s".to_string(), true)]);
    }

    #[test]
    fn test_complete_static_lib_barrier() {
        let mut b = GraphBuilder::new();
        b.add(Target::new(label("//i:i"), OutputType::StaticLibrary))
            .add(
                Target::new(label("//c:c"), OutputType::StaticLibrary)
                    .with_complete_static_lib(true)
                    .with_public_deps([label("//i:i")]),
            )
            .add(
                Target::new(label("//e:e"), OutputType::Executable)
                    .with_public_deps([label("//c:c")]),
            );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let list = data.inherited_libraries(lookup(&graph, "//e:e")).unwrap();

        assert_eq!(pairs_to_labels(&list), vec![("//c:c".to_string(), true)]);
    }

    #[test]
    fn test_private_edge_downgrades_publicness() {
        // E --private--> A (static) --public--> B (static): B must be
        // private in E's list even though A exports it publicly.
        let mut b = GraphBuilder::new();
        b.add(Target::new(label("//b:b"), OutputType::StaticLibrary))
            .add(
                Target::new(label("//a:a"), OutputType::StaticLibrary)
                    .with_public_deps([label("//b:b")]),
            )
            .add(
                Target::new(label("//e:e"), OutputType::Executable)
                    .with_private_deps([label("//a:a")]),
            );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let e_list = data.inherited_libraries(lookup(&graph, "//e:e")).unwrap();
        let a_list = data.inherited_libraries(lookup(&graph, "//a:a")).unwrap();

        assert_eq!(
            pairs_to_labels(&e_list),
            vec![("//a:a".to_string(), false), ("//b:b".to_string(), false)]
        );
        // Every entry of A's list appears in E's with publicness no
        // greater than in A's.
        for (name, is_public) in pairs_to_labels(&a_list) {
            let in_e = pairs_to_labels(&e_list)
                .into_iter()
                .find(|(n, _)| *n == name)
                .unwrap();
            assert!(!in_e.1 || is_public);
        }
    }

    #[test]
    fn test_group_forwards_children() {
        let mut b = GraphBuilder::new();
        b.add(Target::new(label("//lib:lib"), OutputType::StaticLibrary))
            .add(
                Target::new(label("//g:g"), OutputType::Group)
                    .with_public_deps([label("//lib:lib")]),
            )
            .add(
                Target::new(label("//e:e"), OutputType::Executable)
                    .with_public_deps([label("//g:g")]),
            );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let list = data.inherited_libraries(lookup(&graph, "//e:e")).unwrap();

        assert_eq!(
            pairs_to_labels(&list),
            vec![("//g:g".to_string(), true), ("//lib:lib".to_string(), true)]
        );
    }

    #[test]
    fn test_self_never_included_and_no_duplicates() {
        let mut b = GraphBuilder::new();
        b.add(Target::new(label("//b:b"), OutputType::SourceSet))
            .add(
                Target::new(label("//a:a"), OutputType::StaticLibrary)
                    .with_public_deps([label("//b:b")])
                    .with_private_deps([label("//b:b")]),
            );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let list = data.inherited_libraries(lookup(&graph, "//a:a")).unwrap();

        let names: Vec<_> = pairs_to_labels(&list).into_iter().map(|(n, _)| n).collect();
        assert!(!names.contains(&"//a:a".to_string()));
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);
    }

    #[test]
    fn test_rust_closure_crosses_shared_boundary() {
        // E (rust exe) -> D (rust shared) -> R (rust lib): the standard
        // query stops at D, the Rust query reaches R.
        let mut b = GraphBuilder::new();
        b.add(
            Target::new(label("//r:r"), OutputType::StaticLibrary).with_lang(Language::Rust),
        )
        .add(
            Target::new(label("//d:d"), OutputType::SharedLibrary)
                .with_lang(Language::Rust)
                .with_public_deps([label("//r:r")]),
        )
        .add(
            Target::new(label("//e:e"), OutputType::Executable)
                .with_lang(Language::Rust)
                .with_public_deps([label("//d:d")]),
        );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let standard = data.inherited_libraries(lookup(&graph, "//e:e")).unwrap();
        let rust = data
            .rust_transitive_inherited_libs(lookup(&graph, "//e:e"))
            .unwrap();

        assert_eq!(pairs_to_labels(&standard), vec![("//d:d".to_string(), true)]);
        assert_eq!(
            pairs_to_labels(&rust),
            vec![("//d:d".to_string(), true), ("//r:r".to_string(), true)]
        );
    }

    #[test]
    fn test_rust_complete_static_lib_stays_terminal() {
        // E (rust exe) -> C (rust complete static) -> R (rust lib): the
        // Rust-aware walk crosses shared libraries, but a complete static
        // library embeds its deps and stays a barrier.
        let mut b = GraphBuilder::new();
        b.add(
            Target::new(label("//r:r"), OutputType::StaticLibrary).with_lang(Language::Rust),
        )
        .add(
            Target::new(label("//c:c"), OutputType::StaticLibrary)
                .with_lang(Language::Rust)
                .with_complete_static_lib(true)
                .with_public_deps([label("//r:r")]),
        )
        .add(
            Target::new(label("//e:e"), OutputType::Executable)
                .with_lang(Language::Rust)
                .with_public_deps([label("//c:c")]),
        );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let rust = data
            .rust_transitive_inherited_libs(lookup(&graph, "//e:e"))
            .unwrap();
        let standard = data.inherited_libraries(lookup(&graph, "//e:e")).unwrap();

        assert_eq!(pairs_to_labels(&rust), vec![("//c:c".to_string(), true)]);
        assert_eq!(pairs_to_labels(&standard), vec![("//c:c".to_string(), true)]);
    }

    #[test]
    fn test_recursive_hard_deps() {
        // E -> A -> B, A.hard_dep, B not; E -> C, C.hard_dep.
        let mut b = GraphBuilder::new();
        b.add(Target::new(label("//b:b"), OutputType::StaticLibrary))
            .add(
                Target::new(label("//a:a"), OutputType::StaticLibrary)
                    .with_hard_dep(true)
                    .with_private_deps([label("//b:b")]),
            )
            .add(
                Target::new(label("//c:c"), OutputType::Action).with_hard_dep(true),
            )
            .add(
                Target::new(label("//e:e"), OutputType::Executable)
                    .with_private_deps([label("//a:a")])
                    .with_data_deps([label("//c:c")]),
            );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let set = data.recursive_hard_deps(lookup(&graph, "//e:e")).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.contains(&label("//a:a")));
        assert!(set.contains(&label("//c:c")));
        assert!(!set.contains(&label("//b:b")));
    }

    #[test]
    fn test_lib_info_concatenation_and_dedup() {
        let dir = |s: &str| SourceDir::new(s).unwrap();
        let mut b = GraphBuilder::new();
        b.add(
            Target::new(label("//z:z"), OutputType::StaticLibrary)
                .with_libs([LibFile::new("z"), LibFile::new("m")])
                .with_lib_dirs([dir("//z/lib")]),
        )
        .add(
            Target::new(label("//e:e"), OutputType::Executable)
                .with_libs([LibFile::new("m")])
                .with_lib_dirs([dir("//e/lib"), dir("//z/lib")])
                .with_public_deps([label("//z:z")]),
        );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let info = data.lib_info(lookup(&graph, "//e:e")).unwrap();

        let libs: Vec<_> = info.all_libs.iter().map(|l| l.value()).collect();
        assert_eq!(libs, ["m", "z"], "own libs first, dedup keeps first occurrence");

        let dirs: Vec<_> = info.all_lib_dirs.iter().map(|d| d.value()).collect();
        assert_eq!(dirs, ["//e/lib/", "//z/lib/"]);
    }

    #[test]
    fn test_framework_info() {
        let mut b = GraphBuilder::new();
        b.add(
            Target::new(label("//ui:ui"), OutputType::StaticLibrary)
                .with_frameworks([Atom::new("AppKit.framework")])
                .with_weak_frameworks([Atom::new("Metal.framework")]),
        )
        .add(
            Target::new(label("//e:e"), OutputType::Executable)
                .with_frameworks([Atom::new("Security.framework")])
                .with_public_deps([label("//ui:ui")]),
        );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let info = data.framework_info(lookup(&graph, "//e:e")).unwrap();

        let frameworks: Vec<_> = info.all_frameworks.iter().map(|a| a.as_str()).collect();
        assert_eq!(frameworks, ["Security.framework", "AppKit.framework"]);
        assert_eq!(info.all_weak_frameworks.len(), 1);
    }

    #[test]
    fn test_memoization_is_observable() {
        let mut b = GraphBuilder::new();
        b.add(Target::new(label("//a:a"), OutputType::StaticLibrary))
            .add(
                Target::new(label("//e:e"), OutputType::Executable)
                    .with_public_deps([label("//a:a")]),
            );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let e = lookup(&graph, "//e:e");

        let first = data.inherited_libraries(e).unwrap();
        let second = data.inherited_libraries(e).unwrap();
        assert!(Rc::ptr_eq(&first, &second), "repeat queries share the memo");

        let hard_first = data.recursive_hard_deps(e).unwrap();
        let hard_second = data.recursive_hard_deps(e).unwrap();
        assert!(Rc::ptr_eq(&hard_first, &hard_second));
    }

    #[test]
    fn test_cycle_detected() {
        // The loader rejects cycles, so build one by hand.
        let mut b = GraphBuilder::new();
        b.add(
            Target::new(label("//a:a"), OutputType::StaticLibrary)
                .with_public_deps([label("//b:b")]),
        )
        .add(
            Target::new(label("//b:b"), OutputType::StaticLibrary)
                .with_public_deps([label("//a:a")]),
        );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let err = data
            .inherited_libraries(lookup(&graph, "//a:a"))
            .unwrap_err();
        assert!(matches!(err, AggregationError::CycleDetected { .. }));
    }

    #[test]
    fn test_missing_dependency_reported() {
        let mut b = GraphBuilder::new();
        b.add(
            Target::new(label("//a:a"), OutputType::Executable)
                .with_public_deps([label("//ghost:ghost")]),
        );
        let graph = b.build();

        let data = ResolvedTargetData::new(&graph);
        let err = data
            .inherited_libraries(lookup(&graph, "//a:a"))
            .unwrap_err();
        assert!(matches!(err, AggregationError::MissingDependency { .. }));
    }
}
