//! The resolved build graph: owner of all targets.
//!
//! Once loaded and validated the graph never changes, so any number of
//! readers (including aggregators on other threads) can share it.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::label::Label;
use crate::core::target::Target;

/// Errors detected while assembling or validating the graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate target `{label}`")]
    DuplicateTarget { label: String },

    #[error("target `{from}` depends on `{dep}`, which is not declared anywhere")]
    MissingDependency { from: String, dep: String },
}

/// All resolved targets, keyed and iterated in label order.
#[derive(Debug, Default)]
pub struct BuildGraph {
    targets: BTreeMap<Label, Target>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a target. The label must be unique.
    pub fn add_target(&mut self, target: Target) -> Result<(), GraphError> {
        let label = target.label();
        if self.targets.contains_key(&label) {
            return Err(GraphError::DuplicateTarget {
                label: label.user_visible_name(true),
            });
        }
        self.targets.insert(label, target);
        Ok(())
    }

    pub fn target(&self, label: &Label) -> Option<&Target> {
        self.targets.get(label)
    }

    /// Targets in label order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Check that every dep edge lands on a declared target. Run once
    /// after loading; aggregation assumes it passed.
    pub fn validate(&self) -> Result<(), GraphError> {
        for target in self.targets.values() {
            for dep in target.all_deps() {
                if !self.targets.contains_key(&dep) {
                    return Err(GraphError::MissingDependency {
                        from: target.label().user_visible_name(true),
                        dep: dep.user_visible_name(true),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source_dir::SourceDir;
    use crate::core::target::OutputType;

    fn label(s: &str) -> Label {
        let tc = Label::new(SourceDir::new("//tc").unwrap(), "default");
        Label::resolve(SourceDir::root(), &tc, s).unwrap()
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut graph = BuildGraph::new();
        graph
            .add_target(Target::new(label("//a:a"), OutputType::Group))
            .unwrap();
        let err = graph
            .add_target(Target::new(label("//a:a"), OutputType::Group))
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateTarget { .. }));
    }

    #[test]
    fn test_validate_missing_dep() {
        let mut graph = BuildGraph::new();
        graph
            .add_target(
                Target::new(label("//a:a"), OutputType::Executable)
                    .with_private_deps([label("//missing:missing")]),
            )
            .unwrap();
        let err = graph.validate().unwrap_err();
        assert!(matches!(err, GraphError::MissingDependency { .. }));
    }

    #[test]
    fn test_iteration_is_label_sorted() {
        let mut graph = BuildGraph::new();
        for l in ["//b:b", "//a:a", "//c:c"] {
            graph
                .add_target(Target::new(label(l), OutputType::Group))
                .unwrap();
        }
        let names: Vec<_> = graph
            .targets()
            .map(|t| t.label().user_visible_name(false))
            .collect();
        assert_eq!(names, ["//a:a", "//b:b", "//c:c"]);
    }
}
