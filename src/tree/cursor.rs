use super::Node;
use crate::{BitSource, Checks, DecodeError};

/// A position in a [`PrefixTree`](super::PrefixTree), advanced one bit at a
/// time.
///
/// Starts at the root, and returns there after every decoded symbol.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    root: &'a Node,
    node: &'a Node,
    depth: usize,
}

impl<'a> Cursor<'a> {
    pub(super) fn new(root: &'a Node) -> Self {
        Self {
            root,
            node: root,
            depth: 0,
        }
    }

    /// Follow the branch for `bit`.
    ///
    /// Returns the symbol if that lands on a leaf (and moves back to the
    /// root), or `None` if more bits are needed. Fails if the branch doesn't
    /// exist; the cursor is left where it was.
    pub fn step(&mut self, bit: bool) -> Result<Option<char>, DecodeError> {
        let Some(next) = self.node.child(bit) else {
            return Err(DecodeError::MalformedTree(format!(
                "no {} branch at depth {}",
                u8::from(bit),
                self.depth
            )));
        };

        if !next.is_leaf() {
            self.node = next;
            self.depth += 1;
            return Ok(None);
        }

        match next.symbol {
            Some(symbol) => {
                self.reset();
                Ok(Some(symbol))
            }
            None => Err(DecodeError::MalformedTree(format!(
                "leaf without a symbol at depth {}",
                self.depth + 1
            ))),
        }
    }

    /// True between codewords.
    pub fn is_at_root(&self) -> bool {
        self.depth == 0
    }

    /// Number of bits consumed by the codeword in progress.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Abandon the codeword in progress.
    pub fn reset(&mut self) {
        self.node = self.root;
        self.depth = 0;
    }
}

/// Iterator over the symbols decoded from a [`BitSource`].
///
/// Created by [`PrefixTree::decode`](super::PrefixTree::decode). Stops after
/// the first error.
pub struct Symbols<'a, B> {
    cursor: Cursor<'a>,
    bits: B,
    checks: Checks,

    /// Number of bits consumed so far, for error messages.
    consumed: u64,

    done: bool,
}

impl<'a, B: BitSource> Symbols<'a, B> {
    pub(super) fn new(cursor: Cursor<'a>, bits: B, checks: Checks) -> Self {
        Self {
            cursor,
            bits,
            checks,
            consumed: 0,
            done: false,
        }
    }

    /// Helper function for `Iterator::next`. The same logic, but slightly
    /// different types.
    ///
    /// Return `Ok(None)` at the end of the bit stream.
    fn next_symbol(&mut self) -> Result<Option<char>, DecodeError> {
        loop {
            let Some(bit) = self.bits.next_bit()? else {
                return self.finish();
            };
            self.consumed += 1;

            if let Some(symbol) = self.cursor.step(bit)? {
                return Ok(Some(symbol));
            }
        }
    }

    fn finish(&mut self) -> Result<Option<char>, DecodeError> {
        if self.cursor.is_at_root() {
            return Ok(None);
        }

        let partial = self.cursor.depth();
        if self.checks.contains(Checks::COMPLETE_STREAM) {
            return Err(DecodeError::TruncatedStream(format!(
                "stream ended {partial} bit(s) into a codeword, after {} bits",
                self.consumed
            )));
        }

        tracing::debug!(
            partial,
            consumed = self.consumed,
            "bit stream ended mid-codeword; dropping the partial codeword"
        );
        self.cursor.reset();
        Ok(None)
    }
}

impl<'a, B: BitSource> Iterator for Symbols<'a, B> {
    type Item = Result<char, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = self.next_symbol().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use crate::PrefixTree;

    use super::*;

    fn abc() -> PrefixTree {
        let mut tree = PrefixTree::new();
        for (symbol, path) in [('a', "0"), ('b', "10"), ('c', "11")] {
            tree.insert_str(symbol, path).unwrap();
        }
        tree
    }

    #[test]
    fn step_by_step() {
        let tree = abc();
        let mut cursor = tree.cursor();
        assert!(cursor.is_at_root());

        assert_eq!(cursor.step(true).unwrap(), None);
        assert!(!cursor.is_at_root());
        assert_eq!(cursor.depth(), 1);

        assert_eq!(cursor.step(false).unwrap(), Some('b'));
        assert!(cursor.is_at_root());

        assert_eq!(cursor.step(false).unwrap(), Some('a'));
        assert!(cursor.is_at_root());
    }

    #[test]
    fn failed_step_leaves_the_cursor_in_place() {
        let mut tree = PrefixTree::new();
        tree.insert_str('a', "00").unwrap();

        let mut cursor = tree.cursor();
        cursor.step(false).unwrap();
        let err = cursor.step(true).unwrap_err();
        assert_eq!(err.to_string(), "malformed tree: no 1 branch at depth 1");
        assert_eq!(cursor.depth(), 1);
        assert_eq!(cursor.step(false).unwrap(), Some('a'));
    }

    #[test]
    fn reset_abandons_the_codeword() {
        let tree = abc();
        let mut cursor = tree.cursor();
        cursor.step(true).unwrap();
        cursor.reset();
        assert_eq!(cursor.step(false).unwrap(), Some('a'));
    }

    #[test]
    fn symbols_end_with_the_stream() {
        let tree = abc();
        let mut symbols = tree.decode([false, true, false, true].into_iter());
        assert_eq!(symbols.next().unwrap().unwrap(), 'a');
        assert_eq!(symbols.next().unwrap().unwrap(), 'b');
        assert!(symbols.next().is_none());
        assert!(symbols.next().is_none());
    }

    #[test]
    fn stream_errors_end_iteration() {
        struct Failing(usize);

        impl BitSource for Failing {
            fn next_bit(&mut self) -> Result<Option<bool>, DecodeError> {
                if self.0 == 0 {
                    return Err(DecodeError::MalformedStream("gone".into()));
                }
                self.0 -= 1;
                Ok(Some(false))
            }
        }

        let tree = abc();
        let mut symbols = tree.decode(Failing(2));
        assert_eq!(symbols.next().unwrap().unwrap(), 'a');
        assert_eq!(symbols.next().unwrap().unwrap(), 'a');
        assert!(matches!(
            symbols.next(),
            Some(Err(DecodeError::MalformedStream(_)))
        ));
        assert!(symbols.next().is_none());
    }
}
