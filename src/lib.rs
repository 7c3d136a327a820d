//! Decoding of prefix codes (Huffman-style codes given as explicit bit-paths).
//!
//! A [`CodeTable`] (or individual [`PrefixTree::insert`] calls) builds a
//! binary tree with one leaf per symbol. Bits from any [`BitSource`] are then
//! decoded by walking that tree from the root, one symbol per leaf reached.

mod bits;
mod bufread;
mod checks;
mod errors;
mod table;
mod tree;

use std::io::BufRead;

pub use crate::bits::{parse_bit_path, BitSource, TextBits};
pub use crate::checks::Checks;
pub use crate::errors::DecodeError;
pub use crate::table::CodeTable;
pub use crate::tree::{Cursor, PrefixTree, Released, Symbols};

use crate::bufread::{DecodedReader, SymbolChunks};

/// Decode a message of `'0'`/`'1'` characters (up to the first line break, or
/// EOF), producing the symbols as UTF-8 text.
pub fn decode<'a>(tree: &'a PrefixTree, message: impl BufRead + 'a) -> impl BufRead + 'a {
    let symbols = tree.decode(TextBits::new(message));
    DecodedReader::new(SymbolChunks::new(symbols))
}
