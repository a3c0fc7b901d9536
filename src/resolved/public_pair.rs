//! (target, is_public) pairs - the elements of inherited-library lists.
//!
//! A pair records one transitive link-time contributor and whether it is
//! reachable from the root of the query through public edges only. The
//! builder keeps the in-order traversal position of the first occurrence
//! of each target and ORs the publicness of every later contribution
//! into that slot.

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::label::Label;
use crate::core::target::Target;

/// One inherited-library entry.
#[derive(Clone, Copy)]
pub struct TargetPublicPair<'g> {
    target: &'g Target,
    is_public: bool,
}

impl<'g> TargetPublicPair<'g> {
    pub fn new(target: &'g Target, is_public: bool) -> Self {
        TargetPublicPair { target, is_public }
    }

    pub fn target(&self) -> &'g Target {
        self.target
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }
}

impl std::fmt::Debug for TargetPublicPair<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {})",
            self.target.label().user_visible_name(false),
            if self.is_public { "public" } else { "private" }
        )
    }
}

/// A finished, packed pair list. Cheap to clone; element-for-element
/// stable across repeated queries.
pub type TargetPublicPairList<'g> = Rc<[TargetPublicPair<'g>]>;

/// Ordered-dedup accumulator for pair lists.
#[derive(Default)]
pub struct TargetPublicPairListBuilder<'g> {
    pairs: Vec<TargetPublicPair<'g>>,
    index: HashMap<Label, usize>,
}

impl<'g> TargetPublicPairListBuilder<'g> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one contribution. The first occurrence of a target wins the
    /// position; publicness is ORed over all occurrences.
    pub fn append(&mut self, target: &'g Target, is_public: bool) {
        match self.index.get(&target.label()) {
            Some(&slot) => {
                self.pairs[slot].is_public |= is_public;
            }
            None => {
                self.index.insert(target.label(), self.pairs.len());
                self.pairs.push(TargetPublicPair::new(target, is_public));
            }
        }
    }

    /// Add every entry of an already-computed list, ANDing each entry's
    /// publicness with `edge_public` (a private edge hides everything
    /// behind it from further propagation).
    pub fn append_inherited(&mut self, list: &[TargetPublicPair<'g>], edge_public: bool) {
        for pair in list {
            self.append(pair.target, pair.is_public && edge_public);
        }
    }

    pub fn build(self) -> TargetPublicPairList<'g> {
        self.pairs.into()
    }
}
