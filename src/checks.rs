use bitflags::bitflags;

bitflags! {
    /// Validation policy for building and decoding with a [`PrefixTree`].
    ///
    /// [`PrefixTree`]: crate::PrefixTree
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Checks: u8 {
        /// Reject a bit-path that equals, extends, or is a prefix of a path
        /// already in the tree.
        ///
        /// Without it, later paths silently overwrite earlier ones, which
        /// corrupts decoding of the affected symbols.
        const PREFIX_FREE = 0b_0000_0001;

        /// Treat a bit stream that ends partway through a codeword as an
        /// error, rather than silently dropping the incomplete suffix.
        const COMPLETE_STREAM = 0b_0000_0010;
    }
}

impl Default for Checks {
    fn default() -> Self {
        Checks::PREFIX_FREE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_only_enforces_prefix_property() {
        let checks = Checks::default();
        assert!(checks.contains(Checks::PREFIX_FREE));
        assert!(!checks.contains(Checks::COMPLETE_STREAM));
    }
}
