mod cursor;

use std::fmt;

use bitvec::{slice::BitSlice, vec::BitVec};

use crate::{bits::parse_bit_path, BitSource, Checks, DecodeError};

pub use self::cursor::{Cursor, Symbols};

/// A binary tree mapping bit-paths to symbols.
///
/// Built incrementally with [`insert`](Self::insert), then decoded against
/// with [`decode`](Self::decode) or a [`Cursor`]. Decoding never mutates the
/// tree, so one tree can be shared by any number of cursors, across threads.
pub struct PrefixTree {
    root: Node,

    /// Total number of nodes, including the root.
    nodes: usize,

    checks: Checks,
}

#[derive(Default)]
struct Node {
    zero: Option<Box<Node>>,
    one: Option<Box<Node>>,

    /// Only meaningful on leaves.
    symbol: Option<char>,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.zero.is_none() && self.one.is_none()
    }

    fn child(&self, bit: bool) -> Option<&Node> {
        if bit {
            self.one.as_deref()
        } else {
            self.zero.as_deref()
        }
    }

    fn child_slot(&mut self, bit: bool) -> &mut Option<Box<Node>> {
        if bit {
            &mut self.one
        } else {
            &mut self.zero
        }
    }

    /// Any symbol stored at or below this node.
    fn any_symbol(&self) -> Option<char> {
        let mut node = self;
        loop {
            match (&node.zero, &node.one) {
                (Some(child), _) | (None, Some(child)) => node = &**child,
                (None, None) => return node.symbol,
            }
        }
    }
}

/// Only the node itself; printing the subtrees would recurse once per bit of
/// the longest codeword.
impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("symbol", &self.symbol)
            .field("zero", &self.zero.is_some())
            .field("one", &self.one.is_some())
            .finish()
    }
}

/// A node handed to the [`PrefixTree::release_with`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Released {
    /// The symbol set on the node, if any. Leaves always have one.
    pub symbol: Option<char>,

    /// Distance from the root.
    pub depth: usize,
}

impl fmt::Debug for PrefixTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixTree")
            .field("nodes", &self.nodes)
            .field("checks", &self.checks)
            .finish_non_exhaustive()
    }
}

impl Default for PrefixTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixTree {
    /// An empty tree (just a root), with the default [`Checks`].
    pub fn new() -> Self {
        Self::with_checks(Checks::default())
    }

    pub fn with_checks(checks: Checks) -> Self {
        Self {
            root: Node::default(),
            nodes: 1,
            checks,
        }
    }

    pub fn checks(&self) -> Checks {
        self.checks
    }

    /// Number of nodes in the tree, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// True if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }

    /// Add `symbol` at the end of `path`, creating any missing nodes along the
    /// way.
    ///
    /// Nodes shared with previously inserted paths are reused. Under
    /// [`Checks::PREFIX_FREE`] a path that collides with an existing one is
    /// rejected and the tree is left untouched; otherwise the later path wins
    /// and the earlier symbol may become unreachable.
    pub fn insert(&mut self, symbol: char, path: &BitSlice) -> Result<(), DecodeError> {
        if path.is_empty() {
            return Err(DecodeError::MalformedPath(format!(
                "empty bit-path for {symbol:?}"
            )));
        }

        if self.checks.contains(Checks::PREFIX_FREE) {
            self.check_prefix_free(symbol, path)?;
        }

        let mut created = 0;
        let mut node = &mut self.root;
        for bit in path.iter().by_vals() {
            node = &mut **node.child_slot(bit).get_or_insert_with(|| {
                created += 1;
                Box::default()
            });
        }
        node.symbol = Some(symbol);
        self.nodes += created;

        tracing::trace!(?symbol, path = %spell(path), created, "inserted codeword");
        Ok(())
    }

    /// Like [`insert`](Self::insert), with the path spelled out in `'0'` and
    /// `'1'` characters.
    pub fn insert_str(&mut self, symbol: char, path: &str) -> Result<(), DecodeError> {
        self.insert(symbol, &parse_bit_path(path)?)
    }

    fn check_prefix_free(&self, symbol: char, path: &BitSlice) -> Result<(), DecodeError> {
        let mut node = &self.root;
        for (i, bit) in path.iter().by_vals().enumerate() {
            if i > 0 && node.is_leaf() {
                return Err(DecodeError::AmbiguousCode(format!(
                    "{:?} ({}) would extend the codeword {} of {:?}",
                    symbol,
                    spell(path),
                    spell(&path[..i]),
                    node.symbol.unwrap_or_default(),
                )));
            }
            match node.child(bit) {
                Some(child) => node = child,
                None => return Ok(()),
            }
        }

        // The whole path already exists.
        let existing = node.any_symbol().unwrap_or_default();
        if node.is_leaf() {
            Err(DecodeError::AmbiguousCode(format!(
                "{:?} and {existing:?} share the codeword {}",
                symbol,
                spell(path),
            )))
        } else {
            Err(DecodeError::AmbiguousCode(format!(
                "{:?} ({}) is a prefix of the codeword of {existing:?}",
                symbol,
                spell(path),
            )))
        }
    }

    /// A fresh cursor, positioned at the root.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.root)
    }

    /// Lazily decode `bits` into symbols.
    ///
    /// Every call starts from the root. If `bits` ends partway through a
    /// codeword, that partial codeword produces nothing (or an error, under
    /// [`Checks::COMPLETE_STREAM`]).
    pub fn decode<B: BitSource>(&self, bits: B) -> Symbols<'_, B> {
        Symbols::new(self.cursor(), bits, self.checks)
    }

    /// Every decodable symbol with its codeword, in lexicographic order of
    /// codewords.
    pub fn codewords(&self) -> Vec<(char, BitVec)> {
        let mut out = vec![];
        let mut stack = vec![(&self.root, BitVec::new())];
        while let Some((node, path)) = stack.pop() {
            if node.is_leaf() {
                if let Some(symbol) = node.symbol {
                    out.push((symbol, path));
                }
                continue;
            }

            // Pushed in reverse, so the 0 branch is visited first.
            for bit in [true, false] {
                if let Some(child) = node.child(bit) {
                    let mut child_path = path.clone();
                    child_path.push(bit);
                    stack.push((child, child_path));
                }
            }
        }
        out
    }

    /// Free every node, returning how many there were.
    ///
    /// Dropping the tree frees it the same way; this just reports the count.
    pub fn release(self) -> usize {
        self.release_with(|_| {})
    }

    /// Free every node, calling `on_release` for each one just before it is
    /// freed.
    ///
    /// Nodes are released in post-order: a node is only released after both
    /// of its subtrees, and the root is released last.
    pub fn release_with(mut self, mut on_release: impl FnMut(Released)) -> usize {
        let released = self.teardown(&mut on_release);
        tracing::debug!(released, "released prefix tree");
        released
    }

    /// Iterative post-order teardown. Codewords can be arbitrarily long, so
    /// recursing (including via the default `Box` drop glue) could overflow
    /// the stack.
    fn teardown(&mut self, on_release: &mut impl FnMut(Released)) -> usize {
        let mut released = 0;
        let mut stack: Vec<(Box<Node>, usize)> = vec![];
        take_children(&mut self.root, 1, &mut stack);

        while let Some((mut node, depth)) = stack.pop() {
            if node.is_leaf() {
                on_release(Released {
                    symbol: node.symbol,
                    depth,
                });
                released += 1;
                continue;
            }

            // Revisit this node once everything above it on the stack (its
            // children's subtrees) is gone.
            let mut children = vec![];
            take_children(&mut node, depth + 1, &mut children);
            stack.push((node, depth));
            stack.extend(children);
        }

        on_release(Released {
            symbol: self.root.symbol.take(),
            depth: 0,
        });
        self.nodes = 1;
        released + 1
    }
}

impl Drop for PrefixTree {
    fn drop(&mut self) {
        if !self.root.is_leaf() {
            self.teardown(&mut |_: Released| {});
        }
    }
}

fn take_children(node: &mut Node, depth: usize, out: &mut Vec<(Box<Node>, usize)>) {
    out.extend(
        [node.zero.take(), node.one.take()]
            .into_iter()
            .flatten()
            .map(|child| (child, depth)),
    );
}

/// Render bits as `'0'`/`'1'` text.
fn spell(bits: &BitSlice) -> String {
    bits.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect()
}
