//! Ancestor inference and tree sequence construction.
//!
//! Three pieces compose end to end: [`builder::AncestorBuilder`]
//! synthesizes ancestral haplotypes from site genotypes,
//! [`matcher::AncestorMatcher`] finds each ancestor's (or sample's)
//! best copying path through the tree sequence built so far, and
//! [`treeseq::TreeSequenceBuilder`] records the resulting edges and
//! mutations into an incrementally growing, dumpable tree sequence.

mod arena;
mod builder;
mod error;
mod flags;
mod matcher;
mod newtypes;
mod treeseq;

pub use builder::{Ancestor, AncestorBuilder, UNKNOWN_ALLELE as BUILDER_UNKNOWN_ALLELE};
pub use error::{TsinferError, TsinferResult};
pub use flags::BuilderFlags;
pub use matcher::{AncestorMatcher, MatchResult, UNKNOWN_ALLELE as MATCHER_UNKNOWN_ALLELE};
pub use newtypes::{EdgeId, MutationId, NodeId, Position, SiteId, Time};
pub use treeseq::{Dump, Edge, MutationRow, NodeRow, TreeSequenceBuilder};
