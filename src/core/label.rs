//! Target identity - WHAT is being named (dir + name + toolchain).
//!
//! A `Label` names a target or other entity in the workspace. It is always
//! absolute, always has a name part, and optionally carries a toolchain
//! (itself a dir/name pair), so one target may exist in several toolchain
//! variants. Labels are small copyable values; every field is an atom, so
//! equality is a handful of pointer compares and the hash is precomputed
//! at construction.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::source_dir::SourceDir;
use crate::util::Atom;

/// Errors from [`Label::resolve`]. All of these are the `BadLabel` class:
/// the input string cannot name anything.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum LabelError {
    /// The label has no name part and none can be inferred.
    #[error("label `{input}` has no name")]
    #[diagnostic(
        code(slipway::label::empty_name),
        help("labels look like `//dir:name`, `//dir` (name inferred), or `:name`")
    )]
    EmptyName { input: String },

    /// A relative label was used where no current directory exists.
    #[error("label `{input}` is relative but there is no current directory (expected a leading `//`)")]
    #[diagnostic(code(slipway::label::missing_slashes))]
    MissingSlashes { input: String },

    /// The name part contains a separator character.
    #[error("label `{input}` has an invalid name `{name}`")]
    #[diagnostic(
        code(slipway::label::invalid_name),
        help("names must not contain `/` or `:`")
    )]
    InvalidName { input: String, name: String },

    /// Mismatched `(` / `)` around the toolchain suffix.
    #[error("unbalanced parenthesis in label `{input}`")]
    #[diagnostic(code(slipway::label::unbalanced_paren))]
    UnbalancedParen { input: String },

    /// A toolchain label carried its own toolchain suffix.
    #[error("toolchain in label `{input}` must not itself have a toolchain")]
    #[diagnostic(code(slipway::label::nested_toolchain))]
    NestedToolchain { input: String },

    /// Path components climbed above the workspace root.
    #[error("directory in label `{input}` escapes the workspace root")]
    #[diagnostic(code(slipway::label::above_root))]
    AboveRoot { input: String },
}

/// A fully qualified target identity.
#[derive(Clone, Copy)]
pub struct Label {
    dir: SourceDir,
    name: Atom,
    toolchain_dir: SourceDir,
    toolchain_name: Atom,
    hash: u64,
}

impl Label {
    /// Make a label with an empty (default) toolchain.
    pub fn new(dir: SourceDir, name: impl Into<Atom>) -> Self {
        Self::with_toolchain(dir, name, SourceDir::null(), Atom::default())
    }

    /// Make a label from an already-separated dir/name and toolchain.
    pub fn with_toolchain(
        dir: SourceDir,
        name: impl Into<Atom>,
        toolchain_dir: SourceDir,
        toolchain_name: impl Into<Atom>,
    ) -> Self {
        let name = name.into();
        let toolchain_name = toolchain_name.into();
        let hash = Self::compute_hash(dir, name, toolchain_dir, toolchain_name);
        Label { dir, name, toolchain_dir, toolchain_name, hash }
    }

    /// The null label: no dir, no name. Invalid as a graph key.
    pub fn null() -> Self {
        Self::new(SourceDir::null(), Atom::default())
    }

    /// Resolve a label string against a current directory and toolchain.
    ///
    /// Accepted forms are `":name"`, `"rel/sub:name"`, `"//abs/sub:name"`,
    /// and `"//abs/sub"` (name inferred from the last path component), each
    /// optionally followed by `"(toolchain_label)"`. A label without a
    /// toolchain suffix inherits `current_toolchain`.
    pub fn resolve(
        current_dir: SourceDir,
        current_toolchain: &Label,
        input: &str,
    ) -> Result<Label, LabelError> {
        // Split off the optional "(toolchain)" suffix.
        let (main, toolchain_str) = match input.find('(') {
            Some(open) => {
                if !input.ends_with(')') {
                    return Err(LabelError::UnbalancedParen { input: input.to_string() });
                }
                (&input[..open], Some(&input[open + 1..input.len() - 1]))
            }
            None => {
                if input.contains(')') {
                    return Err(LabelError::UnbalancedParen { input: input.to_string() });
                }
                (input, None)
            }
        };
        if main.is_empty() {
            return Err(LabelError::EmptyName { input: input.to_string() });
        }

        let (dir, name) = Self::resolve_dir_and_name(current_dir, main, input)?;

        let (toolchain_dir, toolchain_name) = match toolchain_str {
            Some(tc) => {
                if tc.contains('(') || tc.contains(')') {
                    return Err(LabelError::NestedToolchain { input: input.to_string() });
                }
                let (tc_dir, tc_name) = Self::resolve_dir_and_name(current_dir, tc, input)?;
                (tc_dir, tc_name)
            }
            None => (current_toolchain.dir, current_toolchain.name),
        };

        Ok(Label::with_toolchain(dir, name, toolchain_dir, toolchain_name))
    }

    /// Resolve the `dir:name` (or bare `dir`) portion of a label string.
    fn resolve_dir_and_name(
        current_dir: SourceDir,
        main: &str,
        input: &str,
    ) -> Result<(SourceDir, Atom), LabelError> {
        let (dir_str, name_str) = match main.find(':') {
            Some(colon) => (&main[..colon], Some(&main[colon + 1..])),
            None => (main, None),
        };

        if dir_str.is_empty() && name_str.is_none() {
            return Err(LabelError::EmptyName { input: input.to_string() });
        }
        if !dir_str.starts_with("//") && current_dir.is_null() {
            return Err(LabelError::MissingSlashes { input: input.to_string() });
        }

        let dir = current_dir
            .resolve(dir_str)
            .ok_or_else(|| LabelError::AboveRoot { input: input.to_string() })?;

        let name = match name_str {
            Some(n) => {
                if n.is_empty() {
                    return Err(LabelError::EmptyName { input: input.to_string() });
                }
                if n.contains('/') || n.contains(':') {
                    return Err(LabelError::InvalidName {
                        input: input.to_string(),
                        name: n.to_string(),
                    });
                }
                Atom::new(n)
            }
            None => {
                // "//a/b" means "//a/b:b".
                let last = dir
                    .last_component()
                    .ok_or_else(|| LabelError::EmptyName { input: input.to_string() })?;
                Atom::new(last)
            }
        };

        Ok((dir, name))
    }

    pub fn is_null(&self) -> bool {
        self.dir.is_null()
    }

    pub fn dir(&self) -> SourceDir {
        self.dir
    }

    pub fn name(&self) -> &'static str {
        self.name.as_str()
    }

    pub fn name_atom(&self) -> Atom {
        self.name
    }

    pub fn toolchain_dir(&self) -> SourceDir {
        self.toolchain_dir
    }

    pub fn toolchain_name(&self) -> &'static str {
        self.toolchain_name.as_str()
    }

    /// This label's toolchain as its own label (with an empty toolchain).
    pub fn toolchain_label(&self) -> Label {
        Label::new(self.toolchain_dir, self.toolchain_name)
    }

    /// A copy of this label with the toolchain cleared.
    pub fn with_no_toolchain(&self) -> Label {
        Label::new(self.dir, self.name)
    }

    /// Whether the toolchain dir/name match some other label's.
    pub fn toolchains_equal(&self, other: &Label) -> bool {
        self.toolchain_dir == other.toolchain_dir && self.toolchain_name == other.toolchain_name
    }

    /// Format for presentation: `//dir/sub:name`, optionally followed by
    /// `(//tc_dir:tc_name)`.
    pub fn user_visible_name(&self, include_toolchain: bool) -> String {
        let mut out = format!("{}:{}", self.dir.label_form(), self.name);
        if include_toolchain && !self.toolchain_dir.is_null() {
            out.push('(');
            out.push_str(self.toolchain_dir.label_form());
            out.push(':');
            out.push_str(self.toolchain_name.as_str());
            out.push(')');
        }
        out
    }

    /// Like [`Self::user_visible_name`], but includes the toolchain only
    /// when it differs from `default_toolchain` (a toolchain label, whose
    /// dir/name identify the toolchain). Users normally only care about
    /// non-default toolchains.
    pub fn user_visible_name_with_default(&self, default_toolchain: &Label) -> String {
        let is_default = self.toolchain_dir == default_toolchain.dir
            && self.toolchain_name == default_toolchain.name;
        self.user_visible_name(!is_default)
    }

    pub fn precomputed_hash(&self) -> u64 {
        self.hash
    }

    fn compute_hash(
        dir: SourceDir,
        name: Atom,
        toolchain_dir: SourceDir,
        toolchain_name: Atom,
    ) -> u64 {
        let dir = dir.atom().ptr_value() as u64;
        let name = name.ptr_value() as u64;
        let tc_dir = toolchain_dir.atom().ptr_value() as u64;
        let tc_name = toolchain_name.ptr_value() as u64;
        dir.wrapping_mul(131)
            .wrapping_add(name)
            .wrapping_mul(131)
            .wrapping_add(tc_dir)
            .wrapping_mul(131)
            .wrapping_add(tc_name)
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::null()
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.dir == other.dir
            && self.toolchain_dir == other.toolchain_dir
            && self.toolchain_name == other.toolchain_name
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.dir, self.name.as_str(), self.toolchain_dir, self.toolchain_name.as_str()).cmp(&(
            other.dir,
            other.name.as_str(),
            other.toolchain_dir,
            other.toolchain_name.as_str(),
        ))
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_visible_name(true))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_visible_name(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> (SourceDir, Label) {
        let current_dir = SourceDir::new("//a/b").unwrap();
        let tc = Label::new(SourceDir::new("//tc").unwrap(), "default");
        (current_dir, tc)
    }

    #[test]
    fn test_resolve_name_only() {
        let (dir, tc) = ctx();
        let label = Label::resolve(dir, &tc, ":x").unwrap();
        assert_eq!(label.user_visible_name(true), "//a/b:x(//tc:default)");
    }

    #[test]
    fn test_resolve_relative_with_toolchain() {
        let (dir, tc) = ctx();
        let label = Label::resolve(dir, &tc, "../c:y(//other:tc)").unwrap();
        assert_eq!(label.user_visible_name(true), "//a/c:y(//other:tc)");
    }

    #[test]
    fn test_resolve_inferred_name() {
        let (dir, tc) = ctx();
        let label = Label::resolve(dir, &tc, "//q").unwrap();
        assert_eq!(label.user_visible_name(true), "//q:q(//tc:default)");
    }

    #[test]
    fn test_resolve_empty_main_part_fails() {
        let (dir, tc) = ctx();
        assert!(matches!(
            Label::resolve(dir, &tc, "(:x)"),
            Err(LabelError::EmptyName { .. })
        ));
    }

    #[test]
    fn test_resolve_unbalanced_paren_fails() {
        let (dir, tc) = ctx();
        assert!(matches!(
            Label::resolve(dir, &tc, "//a:b(//tc:x"),
            Err(LabelError::UnbalancedParen { .. })
        ));
        assert!(matches!(
            Label::resolve(dir, &tc, "//a:b)"),
            Err(LabelError::UnbalancedParen { .. })
        ));
    }

    #[test]
    fn test_resolve_nested_toolchain_fails() {
        let (dir, tc) = ctx();
        assert!(matches!(
            Label::resolve(dir, &tc, "//a:b(//tc:x(//tc:y))"),
            Err(LabelError::NestedToolchain { .. })
        ));
    }

    #[test]
    fn test_resolve_empty_name_fails() {
        let (dir, tc) = ctx();
        assert!(matches!(
            Label::resolve(dir, &tc, "//a/b:"),
            Err(LabelError::EmptyName { .. })
        ));
    }

    #[test]
    fn test_resolve_relative_without_context_fails() {
        let tc = Label::new(SourceDir::new("//tc").unwrap(), "default");
        assert!(matches!(
            Label::resolve(SourceDir::null(), &tc, "a/b:x"),
            Err(LabelError::MissingSlashes { .. })
        ));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (dir, tc) = ctx();
        for input in [":x", "../c:y(//other:tc)", "//q", "//a/b:z(//tc:default)"] {
            let first = Label::resolve(dir, &tc, input).unwrap();
            let again =
                Label::resolve(dir, &tc, &first.user_visible_name(true)).unwrap();
            assert_eq!(first, again, "resolving {input} twice diverged");
        }
    }

    #[test]
    fn test_equality_implies_hash_and_order_consistency() {
        let (dir, tc) = ctx();
        let a = Label::resolve(dir, &tc, "//a/b:x").unwrap();
        let b = Label::resolve(dir, &tc, ":x").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.precomputed_hash(), b.precomputed_hash());
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let (dir, tc) = ctx();
        let a = Label::resolve(dir, &tc, "//a:a").unwrap();
        let b = Label::resolve(dir, &tc, "//a:b").unwrap();
        let c = Label::resolve(dir, &tc, "//b:a").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_user_visible_name_with_default() {
        let (dir, tc) = ctx();
        let same = Label::resolve(dir, &tc, ":x").unwrap();
        let other = Label::resolve(dir, &tc, ":x(//other:tc)").unwrap();
        assert_eq!(same.user_visible_name_with_default(&tc), "//a/b:x");
        assert_eq!(
            other.user_visible_name_with_default(&tc),
            "//a/b:x(//other:tc)"
        );
    }

    #[test]
    fn test_toolchain_label_round_trip() {
        let (dir, tc) = ctx();
        let label = Label::resolve(dir, &tc, ":x").unwrap();
        assert_eq!(label.toolchain_label(), tc.with_no_toolchain());
        assert!(label.with_no_toolchain().toolchain_dir().is_null());

        let sibling = Label::resolve(dir, &tc, "//q").unwrap();
        assert!(label.toolchains_equal(&sibling));
        assert!(!label.toolchains_equal(&label.with_no_toolchain()));
    }

    #[test]
    fn test_root_dir_presentation() {
        let (_, tc) = ctx();
        let label = Label::resolve(SourceDir::root(), &tc, ":top").unwrap();
        assert_eq!(label.user_visible_name(false), "//:top");
    }
}
