//! Transitive aggregation over the resolved graph.
//!
//! Everything a generator needs to know about a target beyond its own
//! declaration is computed here: inherited libraries with public/private
//! flags, library and framework search data, hard-dependency closures,
//! and the Rust transitive closure.

pub mod public_pair;
pub mod target_data;

pub use public_pair::{TargetPublicPair, TargetPublicPairList, TargetPublicPairListBuilder};
pub use target_data::{
    pairs_to_labels, AggregationError, FrameworkInfo, LibInfo, ResolvedTargetData, TargetSet,
};
