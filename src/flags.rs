//! Configuration flags.

use bitflags::bitflags;

bitflags! {
    /// Controls the behavior of [`crate::treeseq::TreeSequenceBuilder::add_path`].
    ///
    /// The default (`empty()`) behavior inserts each child's edges
    /// verbatim. With [`RESOLVE_SHARED_RECOMBS`](Self::RESOLVE_SHARED_RECOMBS)
    /// set, identical recombination breakpoints shared by two or more
    /// children are collapsed into a single synthesized internal node.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BuilderFlags: u32 {
        /// Default behavior: no shared-recombination resolution.
        const NONE = 0;
        /// Collapse shared recombination breakpoints into new internal nodes.
        const RESOLVE_SHARED_RECOMBS = 1 << 0;
    }
}

impl BuilderFlags {
    /// `true` if every set bit corresponds to a known flag.
    pub fn is_valid(&self) -> bool {
        Self::from_bits(self.bits()).is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_none() {
        assert_eq!(BuilderFlags::default(), BuilderFlags::NONE);
    }

    #[test]
    fn unknown_bits_are_invalid() {
        let bits = BuilderFlags::from_bits_retain(1 << 5);
        assert!(!bits.is_valid());
    }

    #[test]
    fn known_bits_are_valid() {
        assert!(BuilderFlags::RESOLVE_SHARED_RECOMBS.is_valid());
    }
}
